//! System Bridge launcher entry point.
//!
//! Reads `launcher.toml`, starts every configured application, and restarts
//! any that fail until Ctrl+C is pressed or a restart budget runs out.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- launcher.toml (defaults when missing)
//!  └─ run_all()
//!       ├─ supervise(app 1)  -- spawn, wait, back off, respawn
//!       └─ supervise(app 2)
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sysbridge_launcher::application::run_all;
use sysbridge_launcher::infrastructure::config::{default_config_path, load_config, LauncherConfig};

#[derive(Debug, Parser)]
#[command(
    name = "sysbridge-launcher",
    about = "Launches the System Bridge backend and keeps it running",
    version
)]
struct Cli {
    /// Launcher config file.  Defaults to the platform config directory.
    #[arg(long, env = "SYSTEM_BRIDGE_LAUNCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info", env = "SYSTEM_BRIDGE_LOG_LEVEL")]
    log_level: String,
}

impl Cli {
    fn load_launcher_config(&self) -> anyhow::Result<LauncherConfig> {
        match self.config.clone().or_else(default_config_path) {
            Some(path) => load_config(&path)
                .with_context(|| format!("failed to load launcher config from {}", path.display())),
            None => Ok(LauncherConfig::default()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = cli.load_launcher_config()?;
    if config.applications.is_empty() {
        warn!("no applications configured; nothing to launch");
        return Ok(());
    }
    info!("launching {} application(s)", config.applications.len());

    // Shutdown flag shared by every supervisor.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    let failures = run_all(&config.applications, config.restart.backoff(), running).await;
    for failure in &failures {
        error!("{failure}");
    }
    if !failures.is_empty() {
        bail!("{} application(s) could not be kept running", failures.len());
    }

    info!("launcher stopped");
    Ok(())
}
