//! Keep-alive supervision of child processes.
//!
//! # How supervision works (for beginners)
//!
//! [`supervise`] runs one application in a loop:
//!
//! 1. Spawn the process and wait for it to exit.
//! 2. Exit code 0 means the application finished on purpose: stop.
//! 3. A non-zero exit (or a failure to spawn at all) is logged, then the
//!    supervisor sleeps for the backoff delay and starts it again.
//! 4. When the restart budget is spent the supervisor gives up with
//!    [`LaunchError::RetriesExhausted`].
//!
//! Clearing the shared `running` flag stops the loop at any point; a child
//! that is still running is killed.

use std::process::ExitStatus;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use sysbridge_core::ExponentialBackoff;
use thiserror::Error;
use tokio::process::Command;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::infrastructure::config::AppSpec;

/// How often a waiting supervisor checks the shutdown flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaunchError {
    #[error("application {name} still failing after {restarts} restarts; giving up")]
    RetriesExhausted { name: String, restarts: u32 },

    #[error("supervisor for {name} stopped unexpectedly: {reason}")]
    Supervisor { name: String, reason: String },
}

/// Why one run of the child ended.
enum RunOutcome {
    Exited(ExitStatus),
    SpawnFailed(std::io::Error),
    ShutDown,
}

/// Runs `app` until it exits cleanly, the restart budget runs out, or
/// `running` is cleared.
///
/// # Errors
///
/// [`LaunchError::RetriesExhausted`] once `backoff` allows no more restarts.
pub async fn supervise(
    app: &AppSpec,
    backoff: ExponentialBackoff,
    running: Arc<AtomicBool>,
) -> Result<(), LaunchError> {
    let mut restarts = 0u32;

    while running.load(Ordering::Relaxed) {
        match run_once(app, &running).await {
            RunOutcome::Exited(status) if status.success() => {
                info!("application {} exited normally", app.name);
                return Ok(());
            }
            RunOutcome::Exited(status) => {
                error!("application {} exited with {status}", app.name);
            }
            RunOutcome::SpawnFailed(e) => {
                error!("failed to launch application {} ({}): {e}", app.name, app.command);
            }
            RunOutcome::ShutDown => break,
        }

        let Some(delay) = backoff.next_delay(restarts) else {
            return Err(LaunchError::RetriesExhausted {
                name: app.name.clone(),
                restarts,
            });
        };
        restarts += 1;
        info!("restarting application {} in {delay:?}", app.name);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = wait_for_shutdown(&running) => break,
        }
    }

    info!("supervisor for {} stopped", app.name);
    Ok(())
}

/// Supervises every application concurrently and waits for all of them.
///
/// Returns the failures; an empty vector means every supervisor finished
/// cleanly.
pub async fn run_all(
    apps: &[AppSpec],
    backoff: ExponentialBackoff,
    running: Arc<AtomicBool>,
) -> Vec<LaunchError> {
    let mut set = JoinSet::new();
    for app in apps.iter().cloned() {
        let running = Arc::clone(&running);
        set.spawn(async move {
            let result = supervise(&app, backoff, running).await;
            (app.name, result)
        });
    }

    let mut failures = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((name, Err(e))) => {
                warn!("{name}: {e}");
                failures.push(e);
            }
            Err(e) => failures.push(LaunchError::Supervisor {
                name: "<unknown>".to_string(),
                reason: e.to_string(),
            }),
        }
    }
    failures
}

async fn run_once(app: &AppSpec, running: &AtomicBool) -> RunOutcome {
    info!("launching application {}: {} {:?}", app.name, app.command, app.args);
    let mut child = match Command::new(&app.command)
        .args(&app.args)
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return RunOutcome::SpawnFailed(e),
    };

    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => RunOutcome::Exited(status),
            Err(e) => RunOutcome::SpawnFailed(e),
        },
        _ = wait_for_shutdown(running) => {
            if let Err(e) = child.kill().await {
                warn!("failed to stop application {}: {e}", app.name);
            }
            RunOutcome::ShutDown
        }
    }
}

async fn wait_for_shutdown(running: &AtomicBool) {
    while running.load(Ordering::Relaxed) {
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }
}
