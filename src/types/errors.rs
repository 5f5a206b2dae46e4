//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the helpers endpoint.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or incomplete request (generic error envelope).
    #[error("validation error: {0}")]
    Validation(String),

    /// Action name not in the dispatch table (generic error envelope).
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A record the handler needs does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Data store reply is missing an expected field or is not valid JSON.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Data store answered with a non-success HTTP status.
    #[error("data store returned HTTP {status} for {uri}")]
    DataStore { status: u16, uri: String },

    /// Outbound HTTP transport errors.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Request-level errors are answered with the bare `{"payload": null}`
    /// envelope. Everything else is a per-request fault.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::UnknownAction(_))
    }

    /// HTTP-like status reported to the host for this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        if self.is_request_error() {
            None
        } else {
            Some(500)
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unknown_action(action: impl Into<String>) -> Self {
        Self::UnknownAction(action.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn data_store(status: u16, uri: impl Into<String>) -> Self {
        Self::DataStore {
            status,
            uri: uri.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_have_no_status() {
        assert!(Error::validation("missing action").is_request_error());
        assert!(Error::unknown_action("drop_tables").is_request_error());
        assert_eq!(Error::validation("x").status_code(), None);
    }

    #[test]
    fn downstream_errors_are_faults() {
        let err = Error::malformed("entry[0] missing");
        assert!(!err.is_request_error());
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(
            Error::data_store(404, "/services/x").to_string(),
            "data store returned HTTP 404 for /services/x"
        );
    }
}
