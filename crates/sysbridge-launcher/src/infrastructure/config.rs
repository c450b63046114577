//! TOML configuration for the launcher.
//!
//! The file lists the applications to keep running and how aggressively to
//! restart them:
//!
//! ```toml
//! [[applications]]
//! name = "systembridgebackend"
//! command = "/opt/systembridge/systembridgebackend"
//! args = ["--no-gui"]
//!
//! [restart]
//! initial_delay_ms = 1000
//! max_delay_ms = 60000
//! max_attempts = 10    # omit to restart forever
//! ```
//!
//! The default location is `launcher.toml` next to the connector's
//! `settings.toml`, in the directory given by
//! [`sysbridge_core::domain::config_dir`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sysbridge_core::domain::config_dir;
use sysbridge_core::ExponentialBackoff;
use thiserror::Error;

/// Error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Schema ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LauncherConfig {
    #[serde(default = "default_applications")]
    pub applications: Vec<AppSpec>,
    #[serde(default)]
    pub restart: RestartPolicy,
}

/// One supervised program.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppSpec {
    /// Label used in logs.
    pub name: String,
    /// Executable to run; resolved through `PATH` when not absolute.
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RestartPolicy {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Restarts allowed before giving up.  Absent means unlimited.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_applications() -> Vec<AppSpec> {
    let command = if cfg!(windows) {
        "systembridgebackend.exe"
    } else {
        "systembridgebackend"
    };
    vec![AppSpec {
        name: "systembridgebackend".to_string(),
        command: command.to_string(),
        args: Vec::new(),
    }]
}
fn default_initial_delay_ms() -> u64 {
    1_000
}
fn default_max_delay_ms() -> u64 {
    60_000
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            applications: default_applications(),
            restart: RestartPolicy::default(),
        }
    }
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: None,
        }
    }
}

impl RestartPolicy {
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.max_attempts,
        )
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

/// Parses a launcher config from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed.
pub fn parse_config(text: &str) -> Result<LauncherConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Loads the config from `path`, returning `LauncherConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<LauncherConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LauncherConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir::config_file("launcher.toml")
}
