//! Core types for the helpers endpoint.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers and the redacted session token
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for transport, data store and templates

mod config;
mod errors;
mod ids;

pub use config::{
    Config, DataStoreConfig, IpcConfig, ObservabilityConfig, ServerConfig, TemplatesConfig,
};
pub use errors::{Error, Result};
pub use ids::{IncidentId, SessionToken};
