//! Configuration structures.
//!
//! Every section has defaults matching a stock single-instance install; the
//! binary overrides them from command-line flags and `ALERT_HELPERS_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global helpers configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Host REST API (data store) configuration.
    #[serde(default)]
    pub datastore: DataStoreConfig,

    /// E-mail template directories.
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// IPC transport configuration.
    #[serde(default)]
    pub ipc: IpcConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// TCP bind address. `None` serves a single connection over stdin/stdout.
    pub listen_addr: Option<String>,
}

/// Host REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataStoreConfig {
    /// REST root, without trailing slash.
    pub base_url: String,

    /// Namespace owner used in `/servicesNS/<owner>/<app>/...` paths.
    pub owner: String,

    /// App namespace holding the alert manager collections.
    pub app: String,

    /// Per-request timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Accept self-signed certificates on the REST port.
    pub accept_invalid_certs: bool,
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://127.0.0.1:8089".to_string(),
            owner: "nobody".to_string(),
            app: "alert_manager".to_string(),
            request_timeout: Duration::from_secs(30),
            accept_invalid_certs: true,
        }
    }
}

/// E-mail template directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// Root directory containing all apps.
    pub apps_dir: PathBuf,

    /// App whose `default/templates` and `local/templates` are listed.
    pub app: String,
}

impl TemplatesConfig {
    pub fn default_dir(&self) -> PathBuf {
        self.apps_dir.join(&self.app).join("default").join("templates")
    }

    pub fn local_dir(&self) -> PathBuf {
        self.apps_dir.join(&self.app).join("local").join("templates")
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            apps_dir: PathBuf::from("/opt/splunk/etc/apps"),
            app: "alert_manager".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error), used when
    /// `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// IPC transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    /// Maximum frame payload size in bytes.
    pub max_frame_bytes: u32,

    /// Maximum concurrent TCP connections. Connections beyond this limit
    /// are refused.
    pub max_connections: usize,

    /// Read timeout per frame (TCP only). Idle connections beyond this
    /// duration are dropped.
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,

    /// Write timeout per frame.
    #[serde(with = "humantime_serde")]
    pub write_timeout: Duration,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: 5 * 1024 * 1024,
            max_connections: 64,
            read_timeout: Duration::from_secs(300),
            write_timeout: Duration::from_secs(10),
        }
    }
}
