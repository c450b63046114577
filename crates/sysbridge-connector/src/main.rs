//! System Bridge connector CLI: entry point.
//!
//! Talks to a running System Bridge backend over its WebSocket API.  One
//! process runs one subcommand: either a long-lived `listen` that streams
//! module updates, a query that prints the reply and exits, or an action that
//! sends a single command.
//!
//! # Usage
//!
//! ```text
//! sysbridge [OPTIONS] <COMMAND>
//!
//! Commands:
//!   listen        Register a data listener and stream updates as JSON lines
//!   get-data      Request module data once and print the replies
//!   directories   List the media directories the backend exposes
//!   files         List files under a media base directory
//!   file          Show one media file's metadata
//!   keypress      Press a key on the backend machine
//!   text          Type text on the backend machine
//!   open-path     Open a path with the backend's default handler
//!   open-url      Open a URL in the backend's browser
//!   exit-backend  Ask the backend application to exit
//!
//! Options:
//!   --host <HOST>         Backend hostname or IP
//!   --port <PORT>         Backend API port
//!   --api-key <KEY>       Pre-shared API key
//!   --heartbeat <SECS>    WebSocket ping period (0 disables)
//!   --config <PATH>       Settings file
//!   --timeout <SECS>      Reply timeout for queries [default: 10]
//! ```
//!
//! # Configuration precedence
//!
//! Command-line flag, then environment variable, then the settings file,
//! then the built-in default.
//!
//! | Variable                  | Default     | Description              |
//! |---------------------------|-------------|--------------------------|
//! | `SYSTEM_BRIDGE_HOST`      | `127.0.0.1` | Backend host             |
//! | `SYSTEM_BRIDGE_PORT`      | `9170`      | Backend API port         |
//! | `SYSTEM_BRIDGE_API_KEY`   | (empty)     | API key                  |
//! | `SYSTEM_BRIDGE_HEARTBEAT` | `30`        | Ping period in seconds   |
//! | `SYSTEM_BRIDGE_CONFIG`    | platform    | Settings file path       |
//!
//! Log output goes to stderr so that stdout carries only JSON.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sysbridge_connector::domain::{ApiKey, ConnectorConfig, ConnectorError};
use sysbridge_connector::infrastructure::settings::{
    default_settings_path, load_settings, Settings,
};
use sysbridge_connector::infrastructure::{websocket_client, WebSocketClient};
use sysbridge_core::models::MediaBase;
use sysbridge_core::{ExponentialBackoff, ModelRegistry, Module, ModulePayload};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Command-line client for the System Bridge API.
///
/// Connection flags are optional so that the settings file can fill in
/// whatever is not given on the command line or in the environment.
#[derive(Debug, Parser)]
#[command(
    name = "sysbridge",
    about = "Command-line client for the System Bridge WebSocket API",
    version
)]
struct Cli {
    /// Hostname or IP address of the backend.
    #[arg(long, global = true, env = "SYSTEM_BRIDGE_HOST")]
    host: Option<String>,

    /// TCP port of the backend API.
    #[arg(long, global = true, env = "SYSTEM_BRIDGE_PORT")]
    port: Option<u16>,

    /// The pre-shared API key.
    #[arg(long, global = true, env = "SYSTEM_BRIDGE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// WebSocket ping period in seconds.  `0` disables the heartbeat.
    #[arg(long, global = true, env = "SYSTEM_BRIDGE_HEARTBEAT")]
    heartbeat: Option<u64>,

    /// Settings file.  Defaults to the platform config directory.
    #[arg(long, global = true, env = "SYSTEM_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// How long query commands wait for their reply, in seconds.
    #[arg(long, global = true, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand, PartialEq)]
enum Action {
    /// Register a data listener and stream updates as JSON lines.
    ///
    /// Reconnects with exponential backoff when the connection drops.
    Listen {
        /// Modules to listen to (comma-separated).
        #[arg(long, value_delimiter = ',', default_values = ["battery", "display"])]
        modules: Vec<String>,
    },
    /// Request module data once and print one reply per module.
    GetData {
        #[arg(long, value_delimiter = ',', required = true)]
        modules: Vec<String>,
    },
    /// List the media directories the backend exposes.
    Directories,
    /// List files under a media base directory.
    Files {
        base: MediaBase,
        /// Sub-path relative to `base`.
        path: Option<String>,
    },
    /// Show one media file's metadata.
    File { base: MediaBase, path: String },
    /// Press a key on the backend machine.
    Keypress { key: String },
    /// Type text on the backend machine.
    Text { text: String },
    /// Open a path with the backend's default handler.
    OpenPath { path: String },
    /// Open a URL in the backend's browser.
    OpenUrl { url: String },
    /// Ask the backend application to exit.
    ExitBackend,
}

impl Cli {
    /// Layers the CLI/environment values over `settings`.
    fn connector_config(&self, settings: &Settings) -> ConnectorConfig {
        let mut config = settings.connector_config();
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(key) = &self.api_key {
            config.api_key = ApiKey::new(key.clone());
        }
        if let Some(secs) = self.heartbeat {
            config.heartbeat_interval = Duration::from_secs(secs);
        }
        config
    }

    fn settings_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_settings_path)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap`.
/// 2. The settings file is loaded (a missing file means defaults).
/// 3. `tracing_subscriber` is initialised.  `RUST_LOG` wins over the
///    settings file's `log_level`.
/// 4. A Ctrl+C handler clears a shared `running` flag.
/// 5. The subcommand runs.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match cli.settings_path() {
        Some(path) => load_settings(&path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let config = cli.connector_config(&settings);
    if config.api_key.is_empty() {
        warn!("no API key configured; the backend will reject commands");
    }

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    let reply_timeout = Duration::from_secs(cli.timeout);
    match cli.action {
        Action::Listen { modules } => run_listen(&config, &modules, running).await,
        action => run_once(&config, action, reply_timeout).await,
    }
}

// ── listen ────────────────────────────────────────────────────────────────────

/// Keeps a listener session alive until Ctrl+C or a non-retryable error.
async fn run_listen(
    config: &ConnectorConfig,
    modules: &[String],
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let backoff = ExponentialBackoff::default();
    let mut attempt = 0u32;

    while running.load(Ordering::Relaxed) {
        let client = websocket_client(config);
        let outcome = tokio::select! {
            result = listen_session(&client, modules, &mut attempt) => Some(result),
            _ = wait_for_shutdown(&running) => None,
        };
        client.close().await;

        let Some(err) = outcome else { break };
        if !err.is_retryable() {
            return Err(err).context("listener stopped");
        }
        let Some(delay) = backoff.next_delay(attempt) else {
            return Err(err).context("giving up after repeated failures");
        };
        attempt += 1;
        warn!("session ended ({err}); reconnecting in {delay:?}");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = wait_for_shutdown(&running) => {}
        }
    }

    info!("listener stopped");
    Ok(())
}

/// One connected session.  Only ever returns with the error that ended it.
async fn listen_session(
    client: &WebSocketClient,
    modules: &[String],
    attempt: &mut u32,
) -> ConnectorError {
    let result = async {
        client.connect().await?;
        client.register_data_listener(modules).await?;
        *attempt = 0;
        client
            .listen(|module, payload| async move {
                if let Err(e) = print_event(module, &payload) {
                    warn!("failed to print {module} event: {e}");
                }
            })
            .await
    }
    .await;

    match result {
        Err(err) => err,
        Ok(never) => match never {},
    }
}

/// Resolves once the `running` flag has been cleared.
async fn wait_for_shutdown(running: &AtomicBool) {
    while running.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

// ── One-shot commands ─────────────────────────────────────────────────────────

async fn run_once(
    config: &ConnectorConfig,
    action: Action,
    reply_timeout: Duration,
) -> anyhow::Result<()> {
    let client = websocket_client(config);
    client
        .connect()
        .await
        .with_context(|| format!("failed to connect to {}", config.endpoint_url()))?;

    let result = perform(&client, action, reply_timeout).await;
    client.close().await;
    result
}

async fn perform(
    client: &WebSocketClient,
    action: Action,
    reply_timeout: Duration,
) -> anyhow::Result<()> {
    let expected = match action {
        Action::Listen { .. } => bail!("listen is not a one-shot command"),
        Action::GetData { modules } => {
            let expected = requested_modules(client.registry(), &modules);
            if expected.is_empty() {
                bail!("none of {modules:?} is a known data module");
            }
            client.get_data(&modules).await?;
            expected
        }
        Action::Directories => {
            client.get_directories().await?;
            vec![Module::MediaDirectories]
        }
        Action::Files { base, path } => {
            client.get_files(base.as_str(), path.as_deref()).await?;
            vec![Module::MediaFiles]
        }
        Action::File { base, path } => {
            client.get_file(base.as_str(), &path).await?;
            vec![Module::MediaFile]
        }
        Action::Keypress { key } => {
            client.press_key(&key).await?;
            Vec::new()
        }
        Action::Text { text } => {
            client.enter_text(&text).await?;
            Vec::new()
        }
        Action::OpenPath { path } => {
            client.open_path(&path).await?;
            Vec::new()
        }
        Action::OpenUrl { url } => {
            client.open_url(&url).await?;
            Vec::new()
        }
        Action::ExitBackend => {
            client.exit_backend().await?;
            Vec::new()
        }
    };

    if expected.is_empty() {
        return Ok(());
    }
    tokio::time::timeout(reply_timeout, print_replies(client, expected))
        .await
        .with_context(|| format!("no reply within {reply_timeout:?}"))?
}

/// The data modules among `names` that the registry knows.  Unknown names
/// are still sent to the backend but nobody waits for them.
fn requested_modules(registry: &ModelRegistry, names: &[String]) -> Vec<Module> {
    let mut modules = Vec::new();
    for name in names {
        match registry.resolve(name) {
            Some(module) if module.is_data_module() => {
                if !modules.contains(&module) {
                    modules.push(module);
                }
            }
            _ => warn!("`{name}` is not a known data module; its reply will be ignored"),
        }
    }
    modules
}

/// Prints events until each of `pending` has been seen once.
async fn print_replies(client: &WebSocketClient, mut pending: Vec<Module>) -> anyhow::Result<()> {
    while !pending.is_empty() {
        let (module, payload) = client.next_event().await?;
        if let Some(pos) = pending.iter().position(|m| *m == module) {
            pending.swap_remove(pos);
            print_event(module, &payload)?;
        }
    }
    Ok(())
}

fn print_event(module: Module, payload: &ModulePayload) -> anyhow::Result<()> {
    let line = serde_json::to_string(&json!({ "module": module.name(), "data": payload }))?;
    println!("{line}");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
