//! Project configuration stored in `.lineage/config.json`.

use lineage_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_DIR: &str = ".lineage";
pub const CONFIG_FILE: &str = "config.json";
pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(flatten)]
    pub session: SessionConfig,
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            session: SessionConfig::default(),
        }
    }
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Loads the config under `root`, or the defaults if there is none.
pub fn load(root: &Path) -> Result<ProjectConfig, Box<dyn std::error::Error>> {
    let path = config_path(root);
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(ProjectConfig::default());
    }

    let text = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}
