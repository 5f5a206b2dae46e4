//! `get_externalworkflowaction_command` handler.
//!
//! Resolves an incident and its results, picks one external workflow action
//! setting by title or label and renders its parameter template into a
//! `| sendalert <title> <parameters>` command.

use super::HandlerContext;
use crate::datastore::{decode, fetch};
use crate::datastore::records::{IncidentResult, Record, WorkflowActionTemplate};
use crate::datastore::uri::{EXTERNAL_WORKFLOW_ACTION_SETTINGS, INCIDENTS, INCIDENT_RESULTS};
use crate::template::{unescape_field_tokens, Template};
use crate::types::{Error, IncidentId, Result};
use serde_json::Value;
use std::collections::HashMap;

const SENDALERT: &str = "| sendalert";
const RESULT_PREFIX: &str = "result.";

/// How the workflow action setting is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSelector {
    Title(String),
    Label(String),
}

impl ActionSelector {
    fn filter(&self) -> (&'static str, &str) {
        match self {
            ActionSelector::Title(title) => ("title", title),
            ActionSelector::Label(label) => ("label", label),
        }
    }
}

/// Build the `sendalert` command for `incident_id`.
///
/// Returns an empty string when the selector does not match exactly one
/// setting.
pub async fn workflow_action_command(
    ctx: HandlerContext<'_>,
    incident_id: &IncidentId,
    selector: &ActionSelector,
) -> Result<String> {
    let incident_uri = ctx
        .namespace
        .collection_where(INCIDENTS, "incident_id", incident_id.as_str());
    let results_uri = ctx
        .namespace
        .collection_where(INCIDENT_RESULTS, "incident_id", incident_id.as_str());
    let (field, value) = selector.filter();
    let settings_uri = ctx
        .namespace
        .collection_where(EXTERNAL_WORKFLOW_ACTION_SETTINGS, field, value);

    let (incidents, results, settings) = tokio::try_join!(
        fetch::<Vec<Record>>(ctx.store, &incident_uri, ctx.token),
        fetch::<Vec<IncidentResult>>(ctx.store, &results_uri, ctx.token),
        fetch::<Vec<Record>>(ctx.store, &settings_uri, ctx.token),
    )?;

    // Only the single match is decoded; the shape of rejected candidates
    // does not matter.
    let setting: WorkflowActionTemplate = match <[Record; 1]>::try_from(settings) {
        Ok([setting]) => decode(Value::Object(setting), &settings_uri)?,
        Err(settings) => {
            tracing::warn!(
                "Number of returned external workflow action settings is incorrect. Expected: 1. Given: {}",
                settings.len()
            );
            return Ok(String::new());
        }
    };

    let incident = incidents
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found(format!("Incident {} not found", incident_id)))?;

    let command = match setting.parameters {
        Some(parameters) => {
            let context = substitution_context(incident, results);
            let parameters = unescape_field_tokens(&parameters);
            let template = Template::parse(&parameters);
            let unresolved: Vec<&str> = template
                .placeholders()
                .filter(|name| !context.contains_key(*name))
                .collect();
            if !unresolved.is_empty() {
                tracing::debug!(?unresolved, "placeholders left verbatim");
            }
            let rendered = template.safe_substitute(&context);
            format!("{} {} {}", SENDALERT, setting.title, rendered)
        }
        None => format!("{} {}", SENDALERT, setting.title),
    };

    tracing::info!(%incident_id, title = %setting.title, "external workflow action command built");
    Ok(command)
}

/// Incident fields as-is plus the first result field-set under `result.`.
fn substitution_context(incident: Record, results: Vec<IncidentResult>) -> HashMap<String, String> {
    let mut context: HashMap<String, String> = incident
        .into_iter()
        .map(|(key, value)| (key, render_value(value)))
        .collect();

    let first_fields = results
        .into_iter()
        .next()
        .and_then(|result| result.fields.into_iter().next());
    if let Some(fields) = first_fields {
        for (key, value) in fields {
            context.insert(format!("{RESULT_PREFIX}{key}"), render_value(value));
        }
    }

    context
}

/// Strings verbatim, everything else as compact JSON.
fn render_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
