//! Observability utilities.

use crate::types::ObservabilityConfig;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Initialize tracing subscriber once for the process.
///
/// Output goes to stderr; stdout carries frames in stdio mode. Log format
/// follows `config.json_logs` and can be forced to JSON via
/// `ALERT_HELPERS_LOG_FORMAT=json`. Filter comes from `RUST_LOG`, falling
/// back to `config.log_level`.
pub fn init_tracing(config: &ObservabilityConfig) {
    TRACING_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| fallback_filter(config));
        let json = use_json(config, std::env::var("ALERT_HELPERS_LOG_FORMAT").ok().as_deref());

        let result = if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}

/// Filter from the configured level; unparsable levels fall back to `info`.
fn fallback_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn use_json(config: &ObservabilityConfig, format_env: Option<&str>) -> bool {
    config.json_logs || format_env.is_some_and(|v| v.eq_ignore_ascii_case("json"))
}
