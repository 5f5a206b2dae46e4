//! Request and response envelopes exchanged with the host.
//!
//! Request:
//! ```json
//! {"query": [["action", "list_status"], ["app", "search"]],
//!  "session": {"authtoken": "..."}}
//! ```
//! Success: `{"payload": <value>, "status": 200}`. Request error:
//! `{"payload": null}`. Downstream fault: `{"payload": null, "status": 500}`.

use crate::types::{Error, Result, SessionToken};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(default)]
    query: Vec<(String, String)>,
    #[serde(default)]
    session: Option<RawSession>,
}

#[derive(Debug, Deserialize)]
struct RawSession {
    #[serde(default)]
    authtoken: Option<String>,
}

/// Query parameters with duplicates collapsed: the first occurrence of a
/// name wins, later ones are discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn flatten<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = HashMap::new();
        for (name, value) in pairs {
            params.entry(name).or_insert(value);
        }
        Self(params)
    }

    /// Value of `name`, treating an empty value as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| Error::validation(format!("Missing required query parameter: {name}")))
    }
}

/// A validated request: action name, flattened parameters and credential.
#[derive(Debug, Clone)]
pub struct HelperRequest {
    pub action: String,
    pub params: QueryParams,
    pub token: SessionToken,
}

impl HelperRequest {
    /// Parse raw request text. Empty input, a body that is not a request
    /// object, a missing `action` and a missing session token are all
    /// validation errors.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::validation("Missing input payload"));
        }

        let request: RawRequest = serde_json::from_str(raw)
            .map_err(|e| Error::validation(format!("Malformed request envelope: {e}")))?;
        let params = QueryParams::flatten(request.query);

        let action = params
            .get("action")
            .ok_or_else(|| Error::validation("Missing action query parameter"))?
            .to_string();

        let token = request
            .session
            .and_then(|s| s.authtoken)
            .and_then(|t| SessionToken::from_string(t).ok())
            .ok_or_else(|| Error::validation("Missing session authtoken"))?;

        Ok(Self {
            action,
            params,
            token,
        })
    }
}

/// Envelope written back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperResponse {
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl HelperResponse {
    pub fn success(payload: Value) -> Self {
        Self {
            payload,
            status: Some(200),
        }
    }

    /// Generic request error: `{"payload": null}`.
    pub fn error() -> Self {
        Self {
            payload: Value::Null,
            status: None,
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self {
            payload: Value::Null,
            status: err.status_code(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Response encoding failed: {}", e);
            r#"{"payload":null}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn flatten_keeps_first_occurrence() {
        let params = QueryParams::flatten(pairs(&[("a", "1"), ("b", "2"), ("a", "3")]));
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), Some("2"));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let params = QueryParams::flatten(pairs(&[("app", "")]));
        assert_eq!(params.get("app"), None);
        assert!(matches!(params.require("app"), Err(Error::Validation(_))));
    }

    #[test]
    fn empty_first_occurrence_is_not_replaced() {
        let params = QueryParams::flatten(pairs(&[("action", ""), ("action", "list_status")]));
        assert_eq!(params.get("action"), None);
    }

    #[test]
    fn parse_valid_request() {
        let raw = json!({
            "query": [["action", "list_status"], ["action", "list_users"]],
            "session": {"authtoken": "tok", "user": "admin"},
            "method": "GET",
        })
        .to_string();
        let request = HelperRequest::parse(&raw).unwrap();
        assert_eq!(request.action, "list_status");
        assert_eq!(request.token.as_str(), "tok");
    }

    #[test]
    fn malformed_requests_are_validation_errors() {
        let cases = [
            String::new(),
            "   ".to_string(),
            "not json".to_string(),
            json!({"query": "action=list_status"}).to_string(),
            json!({"query": [], "session": {"authtoken": "tok"}}).to_string(),
            json!({"query": [["action", ""]], "session": {"authtoken": "tok"}}).to_string(),
            json!({"query": [["action", "list_status"]]}).to_string(),
            json!({"query": [["action", "list_status"]], "session": {}}).to_string(),
            json!({"query": [["action", "list_status"]], "session": {"authtoken": ""}}).to_string(),
        ];
        for raw in cases {
            let err = HelperRequest::parse(&raw).unwrap_err();
            assert!(err.is_request_error(), "{raw:?} gave {err}");
        }
    }

    #[test]
    fn envelopes_serialize_as_documented() {
        assert_eq!(
            HelperResponse::success(json!(["a"])).to_json(),
            r#"{"payload":["a"],"status":200}"#
        );
        assert_eq!(HelperResponse::error().to_json(), r#"{"payload":null}"#);
        assert_eq!(
            HelperResponse::from_error(&Error::malformed("x")).to_json(),
            r#"{"payload":null,"status":500}"#
        );
    }

    proptest! {
        #[test]
        fn flatten_matches_first_seen(raw in prop::collection::vec(("[a-c]", "[0-9]{1,2}"), 0..12)) {
            let params = QueryParams::flatten(raw.clone());
            for (name, _) in &raw {
                let first = raw.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str());
                prop_assert_eq!(params.get(name), first);
            }
        }

        #[test]
        fn success_envelope_always_has_status_200(s in ".*") {
            let encoded = HelperResponse::success(Value::String(s)).to_json();
            let decoded: Value = serde_json::from_str(&encoded).unwrap();
            prop_assert_eq!(&decoded["status"], &json!(200));
        }
    }
}
