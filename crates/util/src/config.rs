//! User configuration for txpanel hosts.
//!
//! A small JSON file (`~/.config/txpanel/config.json` on most platforms)
//! records the default sending account, whether currency validation should
//! report base units, and the log filter. Every field is optional; a missing
//! or unreadable file yields the defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "TXPANEL_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error surfaced when reading or writing the config file fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiConfig {
    /// Account substituted when a sending-address input is left empty.
    pub default_account: Option<String>,
    /// Forwarded to currency validation; when set, amounts are echoed in wei.
    pub show_base_units: bool,
    /// Filter directives for the tracing subscriber.
    pub log_filter: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_account: None,
            show_base_units: true,
            log_filter: crate::logging::DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Resolve the config file path, honoring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("txpanel")
        .join(CONFIG_FILE_NAME)
}

/// Load the config from the default path.
pub fn load_config() -> Result<UiConfig, ConfigError> {
    load_config_from_path(&default_config_path())
}

/// Load the config from a specific path.
pub fn load_config_from_path(path: &Path) -> Result<UiConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(UiConfig::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(UiConfig::default()),
        Err(error) => Err(ConfigError::Io(error)),
    }
}

/// Write the config as pretty JSON, creating parent directories.
pub fn save_config_to_path(config: &UiConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(config)?;
    fs::write(path, data)?;
    Ok(())
}

fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}
