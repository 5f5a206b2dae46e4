//! # Alert Helpers - persistent-connection lookup endpoint
//!
//! Serves the alert manager UI's helper requests on behalf of the host:
//! - User, status, notification scheme and workflow action lookups
//! - Saved-search descriptions
//! - E-mail template discovery across default and local layers
//! - `sendalert` command generation for external workflow actions
//!
//! ## Architecture
//!
//! ```text
//!                   ┌──────────────────────────────────────┐
//!   host frames  →  │ ConnectionServer → Router → handlers │
//!                   │                        │        │    │
//!                   │               DataStore trait  Template
//!                   │                        │     FileLister
//!                   └────────────────────────┼─────────────┘
//!                                            ↓
//!                                  host REST API (token)
//! ```
//!
//! Every handler is read-only and stateless; the only per-request input
//! besides the query parameters is the caller's session token.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod datastore;
pub mod email_templates;
pub mod ipc;
pub mod template;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
