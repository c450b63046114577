//! Infrastructure layer: the launcher's TOML configuration.

pub mod config;

pub use config::{load_config, AppSpec, ConfigError, LauncherConfig, RestartPolicy};
