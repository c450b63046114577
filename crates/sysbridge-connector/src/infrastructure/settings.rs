//! TOML settings file for the connector CLI.
//!
//! The file is optional.  When present it supplies defaults that command-line
//! flags and `SYSTEM_BRIDGE_*` environment variables can still override:
//!
//! ```toml
//! log_level = "info"
//!
//! [api]
//! host = "127.0.0.1"
//! port = 9170
//! token = "0f4c..."
//! heartbeat_secs = 30
//! ```
//!
//! The default location is `settings.toml` in the directory given by
//! [`sysbridge_core::domain::config_dir`].
//!
//! Fields annotated with `#[serde(default = "...")]` fall back to the named
//! function when absent, so a partial file (or none at all) still yields a
//! usable configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sysbridge_core::domain::config_dir;
use thiserror::Error;

use crate::domain::{ApiKey, ConnectorConfig, DEFAULT_HEARTBEAT, DEFAULT_PORT};

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Schema ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub api: ApiSettings,
}

/// Where the backend API listens and how to authenticate with it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// The pre-shared API key.
    #[serde(default)]
    pub token: ApiKey,
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_heartbeat_secs() -> u64 {
    DEFAULT_HEARTBEAT.as_secs()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: ApiKey::default(),
            heartbeat_secs: default_heartbeat_secs(),
        }
    }
}

impl Settings {
    pub fn connector_config(&self) -> ConnectorConfig {
        ConnectorConfig {
            host: self.api.host.clone(),
            port: self.api.port,
            api_key: self.api.token.clone(),
            heartbeat_interval: Duration::from_secs(self.api.heartbeat_secs),
        }
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

/// Parses settings from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed.
pub fn parse_settings(text: &str) -> Result<Settings, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Loads settings from `path`, returning `Settings::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_settings(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// The platform-appropriate settings file path, if the platform config
/// directory can be determined from the environment.
pub fn default_settings_path() -> Option<PathBuf> {
    config_dir::config_file("settings.toml")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("sysbridge-settings-{}", uuid::Uuid::new_v4()))
            .join("settings.toml")
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let settings = parse_settings("").expect("parse");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.connector_config(), ConnectorConfig::default());
    }

    #[test]
    fn test_partial_api_table_keeps_other_defaults() {
        let settings = parse_settings("[api]\nport = 9999\ntoken = \"abc\"\n").expect("parse");

        let config = settings.connector_config();

        assert_eq!(config.port, 9999);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.api_key.expose(), "abc");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_settings("[api\nport = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = load_settings(&scratch_path()).expect("load");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_reads_existing_file() {
        // Arrange
        let path = scratch_path();
        let dir = path.parent().expect("scratch dir").to_path_buf();
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(
            &path,
            "log_level = \"debug\"\n[api]\nhost = \"10.1.1.1\"\ntoken = \"tok\"\n",
        )
        .expect("write");

        // Act
        let loaded = load_settings(&path);
        let _ = std::fs::remove_dir_all(&dir);

        // Assert
        let settings = loaded.expect("load");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.api.host, "10.1.1.1");
        assert_eq!(settings.api.token, ApiKey::new("tok"));
    }

    #[test]
    fn test_default_path_is_settings_toml() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with("settings.toml"));
        }
    }
}
