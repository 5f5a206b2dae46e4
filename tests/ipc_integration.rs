//! Integration tests: codec → server → router → REST data store → fake host API.

use alert_helpers::datastore::uri::Namespace;
use alert_helpers::datastore::{DataStore, RestDataStore, RestUserDirectory};
use alert_helpers::email_templates::TemplateFileLister;
use alert_helpers::ipc::codec::{read_frame, write_frame, MSG_REQUEST, MSG_RESPONSE};
use alert_helpers::ipc::{ConnectionServer, Router};
use alert_helpers::types::IpcConfig;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Json;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};

const TOKEN: &str = "valid-session";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Splunk {TOKEN}"))
}

fn collection_records(collection: &str) -> Vec<Value> {
    let records = match collection {
        "alert_status" => json!([
            {"status": "new", "status_description": "New", "internal_only": "0"},
            {"status": "auto_assigned", "status_description": "Auto Assigned", "internal_only": "1"},
            {"status": "resolved", "status_description": "Resolved", "internal_only": "0"},
        ]),
        "notification_schemes" => json!([{"schemeName": "default_notification"}]),
        "externalworkflowaction_settings" => json!([
            {"label": "jira", "title": "Jira", "disabled": "0",
             "parameters": "priority=$severity$ id=$incident_id$ outcome=$result.outcome$"},
            {"label": "old", "title": "Legacy", "disabled": "1"},
            {"label": "dup", "title": "Dup", "disabled": "0"},
            {"label": "dup", "title": "Dup", "disabled": "0"},
        ]),
        "incidents" => json!([{"incident_id": "42", "severity": "high", "owner": "admin"}]),
        "incident_results" => json!([{"incident_id": "42", "fields": [{"outcome": "blocked"}]}]),
        "alert_users" => json!([{"name": "oncall", "email": "oncall@example.com"}]),
        _ => json!([]),
    };
    records.as_array().cloned().unwrap_or_default()
}

async fn collection(
    Path((_owner, _app, collection)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let mut records = collection_records(&collection);
    if let Some(filter) = params.get("query") {
        let filter: HashMap<String, Value> =
            serde_json::from_str(filter).map_err(|_| StatusCode::BAD_REQUEST)?;
        records.retain(|record| filter.iter().all(|(k, v)| record.get(k) == Some(v)));
    }
    Ok(Json(Value::Array(records)))
}

async fn savedsearch(
    Path((_owner, app, name)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if app == "search" && name == "Failed logins" {
        Ok(Json(json!({"entry": [{"name": name, "content": {"description": "Brute force attempts"}}]})))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn users(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({"entry": [
        {"name": "admin", "content": {"realname": "Administrator", "email": "admin@example.com"}}
    ]})))
}

/// Helper: start the fake host REST API, return its base URL.
async fn start_fake_host() -> String {
    let app = axum::Router::new()
        .route(
            "/servicesNS/{owner}/{app}/storage/collections/data/{collection}",
            get(collection),
        )
        .route(
            "/servicesNS/{owner}/{app}/admin/savedsearch/{name}",
            get(savedsearch),
        )
        .route("/services/authentication/users", get(users));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Helper: spin up the helpers server against the fake host, return its
/// address and the template root (kept alive for the test's duration).
async fn start_test_server() -> (std::net::SocketAddr, TempDir) {
    let base_url = start_fake_host().await;

    let apps_dir = TempDir::new().unwrap();
    let default_dir = apps_dir.path().join("alert_manager/default/templates");
    let local_dir = apps_dir.path().join("alert_manager/local/templates");
    std::fs::create_dir_all(&default_dir).unwrap();
    std::fs::create_dir_all(&local_dir).unwrap();
    std::fs::write(default_dir.join("default_incident_created.html"), "").unwrap();
    std::fs::write(local_dir.join("default_incident_created.html"), "").unwrap();
    std::fs::write(local_dir.join("custom.html"), "").unwrap();
    std::fs::write(local_dir.join("notes.txt"), "").unwrap();

    let namespace = Namespace::new("nobody", "alert_manager");
    let store: Arc<dyn DataStore> =
        Arc::new(RestDataStore::with_client(reqwest::Client::new(), &base_url));
    let users = Arc::new(RestUserDirectory::new(store.clone(), namespace.clone()));
    let router = Arc::new(Router::new(
        store,
        users,
        TemplateFileLister::new(default_dir, local_dir),
        namespace,
        tracing::Span::none(),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let server = ConnectionServer::new(router, IpcConfig::default());
        let _ = server.serve_listener(listener).await;
    });

    (addr, apps_dir)
}

/// Helper: send a request frame, receive and decode the response.
async fn round_trip(stream: &mut TcpStream, query: Value, token: &str) -> Value {
    let request = json!({
        "query": query,
        "session": {"authtoken": token, "user": "admin"},
        "method": "GET",
    });
    write_frame(stream, MSG_REQUEST, request.to_string().as_bytes())
        .await
        .unwrap();

    let reply = read_frame(stream, 1024 * 1024).await.unwrap().unwrap();
    assert_eq!(reply.msg_type, MSG_RESPONSE);
    let body: Value = serde_json::from_str(reply.text().unwrap()).unwrap();
    body
}

#[tokio::test]
async fn test_lookup_actions_over_one_connection() {
    let (addr, _apps) = start_test_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let status = round_trip(&mut stream, json!([["action", "list_status"]]), TOKEN).await;
    assert_eq!(
        status,
        json!({"payload": [
            {"status_description": "New", "status": "new"},
            {"status_description": "Resolved", "status": "resolved"},
        ], "status": 200})
    );

    let schemes = round_trip(
        &mut stream,
        json!([["action", "list_notification_schemes"]]),
        TOKEN,
    )
    .await;
    assert_eq!(schemes, json!({"payload": ["default_notification"], "status": 200}));

    let settings = round_trip(
        &mut stream,
        json!([["action", "list_externalworkflowaction_settings"]]),
        TOKEN,
    )
    .await;
    assert_eq!(
        settings["payload"],
        json!([
            {"label": "jira", "title": "Jira"},
            {"label": "dup", "title": "Dup"},
            {"label": "dup", "title": "Dup"},
        ])
    );

    let users = round_trip(&mut stream, json!([["action", "list_users"]]), TOKEN).await;
    assert_eq!(
        users["payload"],
        json!([
            {"name": "admin", "realname": "Administrator", "email": "admin@example.com", "type": "builtin"},
            {"name": "oncall", "email": "oncall@example.com", "type": "alert_manager"},
        ])
    );
}

#[tokio::test]
async fn test_savedsearch_description() {
    let (addr, _apps) = start_test_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let response = round_trip(
        &mut stream,
        json!([
            ["action", "get_savedsearch_description"],
            ["savedsearch", "Failed logins"],
            ["app", "search"],
        ]),
        TOKEN,
    )
    .await;
    assert_eq!(response, json!({"payload": "Brute force attempts", "status": 200}));

    // Unknown saved search: the host answers 404, the request faults.
    let response = round_trip(
        &mut stream,
        json!([
            ["action", "get_savedsearch_description"],
            ["savedsearch", "nope"],
            ["app", "search"],
        ]),
        TOKEN,
    )
    .await;
    assert_eq!(response, json!({"payload": null, "status": 500}));
}

#[tokio::test]
async fn test_email_template_files() {
    let (addr, _apps) = start_test_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let response = round_trip(
        &mut stream,
        json!([["action", "list_email_template_files"]]),
        TOKEN,
    )
    .await;
    assert_eq!(
        response,
        json!({"payload": ["default_incident_created.html", "custom.html"], "status": 200})
    );
}

#[tokio::test]
async fn test_workflow_action_command() {
    let (addr, _apps) = start_test_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let response = round_trip(
        &mut stream,
        json!([
            ["action", "get_externalworkflowaction_command"],
            ["incident_id", "42"],
            ["externalworkflowaction", "Jira"],
        ]),
        TOKEN,
    )
    .await;
    assert_eq!(
        response,
        json!({"payload": "| sendalert Jira priority=high id=42 outcome=blocked", "status": 200})
    );

    // Two settings share the label: no command, still a success envelope.
    let response = round_trip(
        &mut stream,
        json!([
            ["action", "get_externalworkflowaction_command"],
            ["incident_id", "42"],
            ["externalworkflowaction_label", "dup"],
        ]),
        TOKEN,
    )
    .await;
    assert_eq!(response, json!({"payload": "", "status": 200}));
}

#[tokio::test]
async fn test_request_errors_and_faults() {
    let (addr, _apps) = start_test_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let response = round_trip(&mut stream, json!([["action", "list_everything"]]), TOKEN).await;
    assert_eq!(response, json!({"payload": null}));

    let response = round_trip(&mut stream, json!([["app", "search"]]), TOKEN).await;
    assert_eq!(response, json!({"payload": null}));

    // Rejected credential: the host answers 401, the request faults and the
    // connection stays usable.
    let response = round_trip(&mut stream, json!([["action", "list_status"]]), "expired").await;
    assert_eq!(response, json!({"payload": null, "status": 500}));

    let response = round_trip(&mut stream, json!([["action", "list_status"]]), TOKEN).await;
    assert_eq!(response["status"], json!(200));
}
