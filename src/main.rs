//! Alert helpers server - main entry point.
//!
//! Without `--listen` the process serves the single connection its host
//! opened over stdin/stdout; with `--listen` it accepts TCP connections.

use alert_helpers::datastore::uri::Namespace;
use alert_helpers::datastore::{DataStore, RestDataStore, RestUserDirectory};
use alert_helpers::email_templates::TemplateFileLister;
use alert_helpers::ipc::{ConnectionServer, Router};
use alert_helpers::Config;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "alert-helpers", version, about)]
struct Args {
    /// TCP address to listen on. Serves stdin/stdout when omitted.
    #[arg(long, env = "ALERT_HELPERS_LISTEN")]
    listen: Option<SocketAddr>,

    /// Host REST API root.
    #[arg(long, env = "ALERT_HELPERS_REST_URI")]
    rest_uri: Option<String>,

    /// Namespace owner for collection lookups.
    #[arg(long, env = "ALERT_HELPERS_OWNER")]
    owner: Option<String>,

    /// App holding the alert manager collections and templates.
    #[arg(long, env = "ALERT_HELPERS_APP")]
    app: Option<String>,

    /// Directory containing all apps.
    #[arg(long, env = "ALERT_HELPERS_APPS_DIR")]
    apps_dir: Option<PathBuf>,

    /// Per-request timeout for REST calls, e.g. `30s`.
    #[arg(long, env = "ALERT_HELPERS_REQUEST_TIMEOUT", value_parser = parse_duration)]
    request_timeout: Option<Duration>,

    /// Verify the REST API's TLS certificate.
    #[arg(long, env = "ALERT_HELPERS_VERIFY_TLS")]
    verify_tls: bool,

    /// Maximum concurrent TCP connections.
    #[arg(long, env = "ALERT_HELPERS_MAX_CONNECTIONS")]
    max_connections: Option<usize>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, env = "ALERT_HELPERS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit JSON logs.
    #[arg(long)]
    json_logs: bool,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

impl Args {
    fn into_config(self) -> Config {
        let mut config = Config::default();
        config.server.listen_addr = self.listen.map(|addr| addr.to_string());
        if let Some(rest_uri) = self.rest_uri {
            config.datastore.base_url = rest_uri;
        }
        if let Some(owner) = self.owner {
            config.datastore.owner = owner;
        }
        if let Some(app) = self.app {
            config.datastore.app = app.clone();
            config.templates.app = app;
        }
        if let Some(apps_dir) = self.apps_dir {
            config.templates.apps_dir = apps_dir;
        }
        if let Some(timeout) = self.request_timeout {
            config.datastore.request_timeout = timeout;
        }
        config.datastore.accept_invalid_certs = !self.verify_tls;
        if let Some(max_connections) = self.max_connections {
            config.ipc.max_connections = max_connections;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        config.observability.json_logs |= self.json_logs;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config();

    // Initialize observability
    alert_helpers::observability::init_tracing(&config.observability);

    let namespace = Namespace::new(&config.datastore.owner, &config.datastore.app);
    let store: Arc<dyn DataStore> = Arc::new(RestDataStore::new(&config.datastore)?);
    let users = Arc::new(RestUserDirectory::new(store.clone(), namespace.clone()));
    let templates = TemplateFileLister::from_config(&config.templates);

    let router = Arc::new(Router::new(
        store,
        users,
        templates,
        namespace,
        tracing::info_span!("helpers"),
    ));
    let server = Arc::new(ConnectionServer::new(router, config.ipc.clone()));

    tracing::info!("Alert helpers starting (rest_uri={})", config.datastore.base_url);

    let shutdown = {
        let server = server.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, shutting down");
                server.shutdown();
            }
        })
    };

    match config.server.listen_addr.as_deref() {
        Some(addr) => server.serve(addr.parse()?).await?,
        None => server.serve_stdio().await?,
    }

    shutdown.abort();
    Ok(())
}
