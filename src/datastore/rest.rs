//! `reqwest`-backed [`DataStore`] talking to the host REST API.

use super::{DataStore, DataStoreResponse};
use crate::types::{DataStoreConfig, Error, Result, SessionToken};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::Value;

/// Data store reached over HTTP(S), authenticated with the caller's token.
#[derive(Debug, Clone)]
pub struct RestDataStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestDataStore {
    pub fn new(config: &DataStoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DataStore for RestDataStore {
    async fn query(
        &self,
        method: Method,
        uri: &str,
        token: &SessionToken,
    ) -> Result<DataStoreResponse> {
        let url = format!("{}{}", self.base_url, uri);
        let response = self
            .client
            .request(method, &url)
            .header(AUTHORIZATION, format!("Splunk {}", token.as_str()))
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else if !response_ok(status) {
            // Error pages are not always JSON; the status alone is reported.
            serde_json::from_str(&text).unwrap_or(Value::Null)
        } else {
            serde_json::from_str(&text)
                .map_err(|e| Error::malformed(format!("{uri}: invalid JSON body: {e}")))?
        };

        Ok(DataStoreResponse { status, body })
    }
}

fn response_ok(status: u16) -> bool {
    (200..300).contains(&status)
}
