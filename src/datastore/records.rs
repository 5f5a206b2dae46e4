//! Typed records decoded from data store replies.
//!
//! Only the fields the handlers read are declared; everything else in a
//! record is ignored. A missing declared field fails decoding.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Free-form record (incident, incident result field-set).
pub type Record = Map<String, Value>;

/// Integer flag stored either as a number, a numeric string or a boolean.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| D::Error::custom(format!("flag out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("flag is not an integer: {s:?}"))),
        Value::Bool(b) => Ok(i64::from(b)),
        other => Err(D::Error::custom(format!("unexpected flag value: {other}"))),
    }
}

/// Entry of the `alert_status` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusEntry {
    pub status: String,
    pub status_description: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub internal_only: i64,
}

impl StatusEntry {
    pub fn is_public(&self) -> bool {
        self.internal_only == 0
    }
}

/// Projection of a [`StatusEntry`] returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub status_description: String,
    pub status: String,
}

impl From<StatusEntry> for StatusSummary {
    fn from(entry: StatusEntry) -> Self {
        Self {
            status_description: entry.status_description,
            status: entry.status,
        }
    }
}

/// Entry of the `notification_schemes` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationScheme {
    #[serde(rename = "schemeName")]
    pub scheme_name: String,
}

/// Entry of the `externalworkflowaction_settings` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowActionSetting {
    pub label: String,
    pub title: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub disabled: i64,
    #[serde(default)]
    pub parameters: Option<String>,
}

impl WorkflowActionSetting {
    pub fn is_enabled(&self) -> bool {
        self.disabled == 0
    }
}

/// Projection of a [`WorkflowActionSetting`] returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowActionSummary {
    pub label: String,
    pub title: String,
}

impl From<WorkflowActionSetting> for WorkflowActionSummary {
    fn from(setting: WorkflowActionSetting) -> Self {
        Self {
            label: setting.label,
            title: setting.title,
        }
    }
}

/// Settings looked up by title or label for command generation. Only the
/// title and the parameter template matter there.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowActionTemplate {
    pub title: String,
    #[serde(default)]
    pub parameters: Option<String>,
}

/// Entry of the `incident_results` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct IncidentResult {
    pub fields: Vec<Record>,
}

/// Reply of the `admin/savedsearch/<name>` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedSearchListing {
    pub entry: Vec<SavedSearchEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedSearchEntry {
    pub content: SavedSearchContent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedSearchContent {
    #[serde(default)]
    pub description: Option<String>,
}

/// Reply of the built-in user directory endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserListing {
    #[serde(default)]
    pub entry: Vec<UserEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub name: String,
    #[serde(default)]
    pub content: UserContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserContent {
    #[serde(default)]
    pub realname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Entry of the `alert_users` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}
