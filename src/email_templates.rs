//! E-mail template discovery.
//!
//! Templates live in two layers: the app's shipped `default/templates` and
//! the site-specific `local/templates`. Only names are merged; a local file
//! with a shipped name is reported once, under the default layer's slot.

use crate::types::{Result, TemplatesConfig};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const TEMPLATE_SUFFIX: &str = ".html";

/// Lists `.html` template names across the default and local layers.
#[derive(Debug, Clone)]
pub struct TemplateFileLister {
    default_dir: PathBuf,
    local_dir: PathBuf,
}

impl TemplateFileLister {
    pub fn new(default_dir: impl Into<PathBuf>, local_dir: impl Into<PathBuf>) -> Self {
        Self {
            default_dir: default_dir.into(),
            local_dir: local_dir.into(),
        }
    }

    pub fn from_config(config: &TemplatesConfig) -> Self {
        Self::new(config.default_dir(), config.local_dir())
    }

    /// Default layer first, then local; each layer sorted by name; names
    /// already seen are skipped.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for dir in [&self.default_dir, &self.local_dir] {
            for name in list_layer(dir).await? {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }

        Ok(names)
    }
}

/// Sorted template names in one directory. A missing directory is empty.
async fn list_layer(dir: &Path) -> Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "template directory missing");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !name.ends_with(TEMPLATE_SUFFIX) {
            continue;
        }
        match tokio::fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_file() => {}
            // directories, dangling links
            _ => continue,
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
