//! URI builders for the host REST API.

use serde_json::{Map, Value};

/// Collection holding alert status definitions.
pub const ALERT_STATUS: &str = "alert_status";
/// Collection holding notification schemes.
pub const NOTIFICATION_SCHEMES: &str = "notification_schemes";
/// Collection holding external workflow action settings.
pub const EXTERNAL_WORKFLOW_ACTION_SETTINGS: &str = "externalworkflowaction_settings";
/// Collection holding incidents.
pub const INCIDENTS: &str = "incidents";
/// Collection holding the results attached to incidents.
pub const INCIDENT_RESULTS: &str = "incident_results";
/// Collection holding alert-manager-only users.
pub const ALERT_USERS: &str = "alert_users";

/// Built-in user directory endpoint.
pub const AUTHENTICATION_USERS: &str = "/services/authentication/users?output_mode=json&count=0";

/// `/servicesNS/<owner>/<app>` namespace all app-scoped URIs live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    owner: String,
    app: String,
}

impl Namespace {
    pub fn new(owner: impl Into<String>, app: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            app: app.into(),
        }
    }

    /// Same owner, different app.
    pub fn with_app(&self, app: impl Into<String>) -> Self {
        Self::new(self.owner.clone(), app)
    }

    fn prefix(&self) -> String {
        format!(
            "/servicesNS/{}/{}",
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.app)
        )
    }

    /// URI listing every record of `collection`.
    pub fn collection(&self, collection: &str) -> String {
        format!(
            "{}/storage/collections/data/{}?output_mode=json",
            self.prefix(),
            collection
        )
    }

    /// URI listing the records of `collection` whose `field` equals `value`.
    pub fn collection_where(&self, collection: &str, field: &str, value: &str) -> String {
        let mut filter = Map::new();
        filter.insert(field.to_string(), Value::String(value.to_string()));
        let filter = Value::Object(filter).to_string();
        format!(
            "{}&query={}",
            self.collection(collection),
            urlencoding::encode(&filter)
        )
    }

    /// URI of a single saved search in this namespace.
    pub fn saved_search(&self, name: &str) -> String {
        format!(
            "{}/admin/savedsearch/{}?output_mode=json",
            self.prefix(),
            urlencoding::encode(name)
        )
    }
}
