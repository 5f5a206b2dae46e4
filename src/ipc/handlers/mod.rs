//! Action handlers.
//!
//! Every handler is read-only: it issues GETs through the [`DataStore`] with
//! the caller's token (or lists template directories) and reshapes the
//! result.

pub mod lookups;
pub mod templates;
pub mod workflow;

use crate::datastore::uri::Namespace;
use crate::datastore::{DataStore, UserDirectory};
use crate::email_templates::TemplateFileLister;
use crate::types::SessionToken;

/// Collaborators and credential available to a single request.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub store: &'a dyn DataStore,
    pub users: &'a dyn UserDirectory,
    pub templates: &'a TemplateFileLister,
    pub namespace: &'a Namespace,
    pub token: &'a SessionToken,
}

impl std::fmt::Debug for HandlerContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("namespace", self.namespace)
            .field("token", self.token)
            .finish_non_exhaustive()
    }
}
