//! Persistent-connection transport layer.
//!
//! Length-prefixed JSON frames carry one request envelope each; the router
//! answers every request frame with one response frame.

pub mod codec;
pub mod envelope;
pub mod handlers;
pub mod router;
pub mod server;

pub use envelope::{HelperRequest, HelperResponse, QueryParams};
pub use router::{Action, Router};
pub use server::ConnectionServer;
