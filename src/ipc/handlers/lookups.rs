//! Lookup handlers: users, status, saved-search description, notification
//! schemes, external workflow action settings.

use super::HandlerContext;
use crate::datastore::fetch;
use crate::datastore::records::{
    NotificationScheme, SavedSearchListing, StatusEntry, StatusSummary, WorkflowActionSetting,
    WorkflowActionSummary,
};
use crate::datastore::uri::{ALERT_STATUS, EXTERNAL_WORKFLOW_ACTION_SETTINGS, NOTIFICATION_SCHEMES};
use crate::types::{Error, Result};
use serde_json::Value;

/// `list_users`: the user directory's list, unmodified.
pub async fn list_users(ctx: HandlerContext<'_>) -> Result<Vec<Value>> {
    let users = ctx.users.user_list(ctx.token).await?;
    tracing::debug!(count = users.len(), "list_users");
    Ok(users)
}

/// `list_status`: public status definitions.
pub async fn list_status(ctx: HandlerContext<'_>) -> Result<Vec<StatusSummary>> {
    let uri = ctx.namespace.collection(ALERT_STATUS);
    let entries: Vec<StatusEntry> = fetch(ctx.store, &uri, ctx.token).await?;

    let status_list: Vec<StatusSummary> = entries
        .into_iter()
        .filter(StatusEntry::is_public)
        .map(StatusSummary::from)
        .collect();

    tracing::info!(count = status_list.len(), "status list");
    Ok(status_list)
}

/// `get_savedsearch_description`: description of `savedsearch` in `app`,
/// or an empty string when it has none.
pub async fn savedsearch_description(
    ctx: HandlerContext<'_>,
    savedsearch: &str,
    app: &str,
) -> Result<String> {
    let uri = ctx.namespace.with_app(app).saved_search(savedsearch);
    let listing: SavedSearchListing = fetch(ctx.store, &uri, ctx.token).await?;

    let entry = listing
        .entry
        .into_iter()
        .next()
        .ok_or_else(|| Error::malformed(format!("{uri}: no entry for saved search")))?;

    Ok(entry.content.description.unwrap_or_default())
}

/// `list_notification_schemes`: scheme names in stored order.
pub async fn list_notification_schemes(ctx: HandlerContext<'_>) -> Result<Vec<String>> {
    let uri = ctx.namespace.collection(NOTIFICATION_SCHEMES);
    let schemes: Vec<NotificationScheme> = fetch(ctx.store, &uri, ctx.token).await?;
    Ok(schemes.into_iter().map(|s| s.scheme_name).collect())
}

/// `list_externalworkflowaction_settings`: enabled actions as `{label, title}`.
pub async fn list_workflow_action_settings(
    ctx: HandlerContext<'_>,
) -> Result<Vec<WorkflowActionSummary>> {
    let uri = ctx.namespace.collection(EXTERNAL_WORKFLOW_ACTION_SETTINGS);
    let settings: Vec<WorkflowActionSetting> = fetch(ctx.store, &uri, ctx.token).await?;

    Ok(settings
        .into_iter()
        .filter(WorkflowActionSetting::is_enabled)
        .map(WorkflowActionSummary::from)
        .collect())
}
