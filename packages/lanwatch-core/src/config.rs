//! Configuration loading.
//!
//! Settings live in a TOML file (`~/.config/lanwatch/config.toml` by
//! default, overridable per-invocation). Router credentials are
//! required; everything else has a sensible default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// Default seconds between poll cycles.
const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 60;

/// Top-level configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub router: RouterConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Router endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Hostname or IP of the router's web interface.
    pub host: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between poll cycles.
    pub check_interval_seconds: u64,
    /// MAC addresses to notify about. Empty means notify on every
    /// join. Compared case-insensitively.
    pub monitored_devices: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: DEFAULT_CHECK_INTERVAL_SECONDS,
            monitored_devices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Endpoint to POST join events to. If unset, joins only go to
    /// the log.
    pub webhook_url: Option<String>,
}

/// Get the default path to the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lanwatch")
        .join("config.toml")
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location
    /// when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = path.map_or_else(default_config_path, Path::to_path_buf);

        if !path.exists() {
            return Err(Error::ConfigMissing { path });
        }

        let content = fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
            path: path.clone(),
            source,
        })?;

        let config: AppConfig =
            toml::from_str(&content).map_err(|source| Error::ConfigParse {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

/// Generate example config file content.
pub fn generate_example_config() -> String {
    r#"# lanwatch configuration
# Place this file at: ~/.config/lanwatch/config.toml

[router]
# Hostname or IP of the router's web interface
host = "192.168.1.1"
username = "admin"
password = "secret"

[monitor]
# Seconds between poll cycles
# check_interval_seconds = 60

# MAC addresses to notify about; empty or omitted means every join
# monitored_devices = ["AA:BB:CC:DD:EE:FF"]

[notify]
# Endpoint to POST join events to; omit to log joins instead
# webhook_url = "https://example.com/hooks/lanwatch"
"#
    .to_string()
}
