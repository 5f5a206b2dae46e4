//! Strongly-typed identifiers and credentials.
//!
//! All values are validated at construction time and implement common traits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to define a strongly-typed string newtype wrapper.
///
/// Generates: struct, `from_string()`, `as_str()`, Serialize, Deserialize.
/// Passing `redacted` replaces the derived Debug and Display with versions
/// that never print the inner value.
macro_rules! define_id {
    ($name:ident, redacted) => {
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        define_id!(@common $name);

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "(<redacted>)"))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("<redacted>")
            }
        }
    };
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        define_id!(@common $name);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
    (@common $name:ident) => {
        impl $name {
            pub fn from_string(s: String) -> Result<Self, &'static str> {
                if s.is_empty() {
                    return Err(concat!(stringify!($name), " cannot be empty"));
                }
                Ok(Self(s))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(SessionToken, redacted);
define_id!(IncidentId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_rejected() {
        assert!(SessionToken::from_string(String::new()).is_err());
        assert_eq!(
            IncidentId::from_string(String::new()).unwrap_err(),
            "IncidentId cannot be empty"
        );
    }

    #[test]
    fn session_token_never_prints_its_value() {
        let token = SessionToken::from_string("s3cr3t".to_string()).unwrap();
        assert_eq!(token.as_str(), "s3cr3t");
        assert!(!format!("{token:?}").contains("s3cr3t"));
        assert!(!token.to_string().contains("s3cr3t"));
    }

    #[test]
    fn incident_id_displays_verbatim() {
        let id = IncidentId::from_string("42".to_string()).unwrap();
        assert_eq!(id.to_string(), "42");
    }
}
