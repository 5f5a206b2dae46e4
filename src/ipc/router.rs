//! Top-level request router. Validates the envelope, routes by action,
//! delegates to handlers and wraps the result.

use crate::datastore::uri::Namespace;
use crate::datastore::{DataStore, UserDirectory};
use crate::email_templates::TemplateFileLister;
use crate::ipc::envelope::{HelperRequest, HelperResponse, QueryParams};
use crate::ipc::handlers::workflow::ActionSelector;
use crate::ipc::handlers::{lookups, templates, workflow, HandlerContext};
use crate::types::{Error, IncidentId, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{field, Instrument, Span};

/// Supported actions. Names match exactly and case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListUsers,
    ListStatus,
    GetSavedSearchDescription,
    ListNotificationSchemes,
    ListEmailTemplateFiles,
    ListWorkflowActionSettings,
    GetWorkflowActionCommand,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::ListUsers,
        Action::ListStatus,
        Action::GetSavedSearchDescription,
        Action::ListNotificationSchemes,
        Action::ListEmailTemplateFiles,
        Action::ListWorkflowActionSettings,
        Action::GetWorkflowActionCommand,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::ListUsers => "list_users",
            Action::ListStatus => "list_status",
            Action::GetSavedSearchDescription => "get_savedsearch_description",
            Action::ListNotificationSchemes => "list_notification_schemes",
            Action::ListEmailTemplateFiles => "list_email_template_files",
            Action::ListWorkflowActionSettings => "list_externalworkflowaction_settings",
            Action::GetWorkflowActionCommand => "get_externalworkflowaction_command",
        }
    }
}

/// Parameters of a matched action, checked before any handler runs.
#[derive(Debug)]
enum Call<'p> {
    ListUsers,
    ListStatus,
    SavedSearchDescription { savedsearch: &'p str, app: &'p str },
    NotificationSchemes,
    EmailTemplateFiles,
    WorkflowActionSettings,
    WorkflowActionCommand {
        incident_id: IncidentId,
        selector: ActionSelector,
    },
}

impl<'p> Call<'p> {
    fn bind(action: Action, params: &'p QueryParams) -> Result<Self> {
        Ok(match action {
            Action::ListUsers => Call::ListUsers,
            Action::ListStatus => Call::ListStatus,
            Action::GetSavedSearchDescription => Call::SavedSearchDescription {
                savedsearch: params.require("savedsearch")?,
                app: params.require("app")?,
            },
            Action::ListNotificationSchemes => Call::NotificationSchemes,
            Action::ListEmailTemplateFiles => Call::EmailTemplateFiles,
            Action::ListWorkflowActionSettings => Call::WorkflowActionSettings,
            Action::GetWorkflowActionCommand => {
                let selector = match (
                    params.get("externalworkflowaction"),
                    params.get("externalworkflowaction_label"),
                ) {
                    (Some(title), _) => ActionSelector::Title(title.to_string()),
                    (None, Some(label)) => ActionSelector::Label(label.to_string()),
                    (None, None) => {
                        return Err(Error::validation(
                            "Missing externalworkflowaction or externalworkflowaction_label query parameter",
                        ))
                    }
                };
                let incident_id = IncidentId::from_string(params.require("incident_id")?.to_string())
                    .map_err(Error::validation)?;
                Call::WorkflowActionCommand {
                    incident_id,
                    selector,
                }
            }
        })
    }
}

/// Routes host requests to handlers.
///
/// Stateless between requests; every request runs in its own span created
/// under the span the router was constructed with.
pub struct Router {
    store: Arc<dyn DataStore>,
    users: Arc<dyn UserDirectory>,
    templates: TemplateFileLister,
    namespace: Namespace,
    span: Span,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("templates", &self.templates)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl Router {
    pub fn new(
        store: Arc<dyn DataStore>,
        users: Arc<dyn UserDirectory>,
        templates: TemplateFileLister,
        namespace: Namespace,
        span: Span,
    ) -> Self {
        Self {
            store,
            users,
            templates,
            namespace,
            span,
        }
    }

    /// Handle one raw request and produce the envelope for the host. Never
    /// fails: errors become one of the two failure envelopes.
    pub async fn handle(&self, raw: &str) -> HelperResponse {
        let span = tracing::info_span!(
            parent: &self.span,
            "helpers.request",
            action = field::Empty,
            duration_ms = field::Empty,
        );

        async {
            let start = Instant::now();
            let response = match self.dispatch(raw).await {
                Ok(payload) => HelperResponse::success(payload),
                Err(e) if e.is_request_error() => {
                    tracing::warn!("{}", e);
                    HelperResponse::error()
                }
                Err(e) => {
                    tracing::error!("Request failed: {}", e);
                    HelperResponse::from_error(&e)
                }
            };
            let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            Span::current().record("duration_ms", elapsed);
            tracing::debug!(status = ?response.status, "request handled");
            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, raw: &str) -> Result<Value> {
        let request = HelperRequest::parse(raw)?;
        Span::current().record("action", request.action.as_str());

        let action = Action::parse(&request.action)
            .ok_or_else(|| Error::unknown_action(request.action.clone()))?;
        let call = Call::bind(action, &request.params)?;

        let ctx = HandlerContext {
            store: self.store.as_ref(),
            users: self.users.as_ref(),
            templates: &self.templates,
            namespace: &self.namespace,
            token: &request.token,
        };

        match call {
            Call::ListUsers => to_payload(lookups::list_users(ctx).await?),
            Call::ListStatus => to_payload(lookups::list_status(ctx).await?),
            Call::SavedSearchDescription { savedsearch, app } => {
                to_payload(lookups::savedsearch_description(ctx, savedsearch, app).await?)
            }
            Call::NotificationSchemes => to_payload(lookups::list_notification_schemes(ctx).await?),
            Call::EmailTemplateFiles => to_payload(templates::list_email_template_files(ctx).await?),
            Call::WorkflowActionSettings => {
                to_payload(lookups::list_workflow_action_settings(ctx).await?)
            }
            Call::WorkflowActionCommand {
                incident_id,
                selector,
            } => to_payload(workflow::workflow_action_command(ctx, &incident_id, &selector).await?),
        }
    }
}

fn to_payload<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
