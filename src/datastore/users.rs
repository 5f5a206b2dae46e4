//! User directory.

use super::records::{AlertUser, UserListing};
use super::uri::{Namespace, ALERT_USERS, AUTHENTICATION_USERS};
use super::{fetch, DataStore};
use crate::types::{Result, SessionToken};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Source of the user list offered for incident assignment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_list(&self, token: &SessionToken) -> Result<Vec<Value>>;
}

#[derive(Debug, Serialize)]
struct UserSummary {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    realname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Merges built-in platform users with the app's own `alert_users`
/// collection. Built-in users come first; an alert manager user whose name
/// is already taken is skipped.
#[derive(Clone)]
pub struct RestUserDirectory {
    store: Arc<dyn DataStore>,
    namespace: Namespace,
}

impl std::fmt::Debug for RestUserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestUserDirectory")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl RestUserDirectory {
    pub fn new(store: Arc<dyn DataStore>, namespace: Namespace) -> Self {
        Self { store, namespace }
    }
}

#[async_trait]
impl UserDirectory for RestUserDirectory {
    async fn user_list(&self, token: &SessionToken) -> Result<Vec<Value>> {
        let builtin: UserListing = fetch(self.store.as_ref(), AUTHENTICATION_USERS, token).await?;
        let extra: Vec<AlertUser> = fetch(
            self.store.as_ref(),
            &self.namespace.collection(ALERT_USERS),
            token,
        )
        .await?;

        let mut seen = HashSet::new();
        let mut users = Vec::with_capacity(builtin.entry.len() + extra.len());

        let builtin = builtin.entry.into_iter().map(|entry| UserSummary {
            name: entry.name,
            realname: entry.content.realname,
            email: entry.content.email,
            kind: "builtin",
        });
        let extra = extra.into_iter().map(|user| UserSummary {
            name: user.name,
            realname: None,
            email: user.email,
            kind: "alert_manager",
        });

        for user in builtin.chain(extra) {
            if seen.insert(user.name.clone()) {
                users.push(serde_json::to_value(user)?);
            }
        }

        tracing::debug!(count = users.len(), "user list assembled");
        Ok(users)
    }
}
