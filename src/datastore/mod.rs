//! Host REST API access.
//!
//! Handlers never talk HTTP directly: they go through the [`DataStore`] trait
//! with the caller's session token, build URIs with [`uri`] and decode bodies
//! into the typed records of [`records`]. [`RestDataStore`] is the production
//! implementation.

pub mod records;
pub mod rest;
pub mod uri;
pub mod users;

pub use rest::RestDataStore;
pub use users::{RestUserDirectory, UserDirectory};

use crate::types::{Error, Result, SessionToken};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Raw reply from the data store.
#[derive(Debug, Clone, PartialEq)]
pub struct DataStoreResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body.
    pub body: Value,
}

impl DataStoreResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Access to collections and admin endpoints of the host REST API.
///
/// `uri` is a path plus query string relative to the REST root, e.g.
/// `/servicesNS/nobody/alert_manager/storage/collections/data/alert_status?output_mode=json`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn query(
        &self,
        method: Method,
        uri: &str,
        token: &SessionToken,
    ) -> Result<DataStoreResponse>;
}

/// GET `uri` and return the body, turning non-2xx replies into errors.
pub async fn fetch_json(store: &dyn DataStore, uri: &str, token: &SessionToken) -> Result<Value> {
    let response = store.query(Method::GET, uri, token).await?;
    if !response.is_success() {
        return Err(Error::data_store(response.status, uri));
    }
    tracing::debug!(uri, status = response.status, "data store response");
    Ok(response.body)
}

/// GET `uri` and decode the body into `T`.
pub async fn fetch<T: DeserializeOwned>(
    store: &dyn DataStore,
    uri: &str,
    token: &SessionToken,
) -> Result<T> {
    let body = fetch_json(store, uri, token).await?;
    decode(body, uri)
}

/// Decode a JSON body into a typed record, reporting missing or mistyped
/// fields as [`Error::MalformedResponse`].
pub fn decode<T: DeserializeOwned>(body: Value, uri: &str) -> Result<T> {
    serde_json::from_value(body).map_err(|e| Error::malformed(format!("{uri}: {e}")))
}
