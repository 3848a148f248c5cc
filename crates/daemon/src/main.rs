// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Nudge Daemon (nudged)
//!
//! Background process that owns the ticket timers.
//!
//! Architecture:
//! - Listener Task: Spawned task handling socket I/O, feeds events to the runtime
//! - Timer Loop: Main task firing due timers, one spawned task per callback

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;
mod listener;

use nudge_daemon::protocol;

use std::sync::Arc;
use std::time::Duration;

use nudge_storage::WalStore;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

use crate::lifecycle::{Config, LifecycleError, StartupResult};
use crate::listener::Listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("nudged {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("nudged {}", env!("CARGO_PKG_VERSION"));
                println!("Nudge Daemon - reminds ticket requesters and alerts staff on inactivity");
                println!();
                println!("USAGE:");
                println!("    nudged");
                println!();
                println!("The daemon is started by the chat bridge, which forwards ticket");
                println!("messages over a Unix socket and delivers outbound notices through");
                println!("the hook named by NUDGE_HOOK.");
                println!();
                println!("ENVIRONMENT:");
                println!("    NUDGE_HOOK            Bridge hook command (required)");
                println!("    NUDGE_INTAKE_BOT      User id of the ticket intake bot (required)");
                println!("    NUDGE_ALERT_ROLES     Comma-separated staff roles to alert (required)");
                println!("    NUDGE_STATE_DIR       State directory override");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: nudged [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    // Write startup marker to log (before tracing setup, so the bridge can find it)
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config)?;

    info!("Starting daemon");

    let StartupResult {
        mut daemon,
        listener: unix_listener,
        recovery,
    } = match lifecycle::startup(&config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("nudged is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    info!(
        resumed = recovery.resumed,
        escalated = recovery.escalated,
        orphaned = recovery.orphaned,
        idle = recovery.idle,
        failed = recovery.failed,
        "timers rebuilt"
    );

    let shutdown_notify = Arc::new(Notify::new());

    let listener = Listener::new(
        unix_listener,
        Arc::clone(&daemon.runtime),
        daemon.start_time,
        Arc::clone(&shutdown_notify),
    );
    tokio::spawn(listener.run());

    spawn_checkpoint(daemon.store.clone());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Daemon ready, listening on {}",
        config.socket_path.display()
    );

    // Signal ready for the parent process
    println!("READY");

    // NOTE: Must be created outside the loop - select! re-evaluates branches
    // on each iteration, so a sleep() inside would reset every time.
    let mut timer_check = tokio::time::interval(config.timer_check);

    loop {
        tokio::select! {
            _ = shutdown_notify.notified() => {
                info!("Shutdown requested via command");
                break;
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }

            _ = timer_check.tick() => {
                let fired = daemon.fire_timers();
                if fired > 0 {
                    tracing::debug!(fired, "dispatched timers");
                }
            }
        }
    }

    daemon.shutdown().await?;
    info!("Daemon stopped");
    Ok(())
}

/// Checkpoint interval (60 seconds)
const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn a task that periodically snapshots the store and truncates its WAL.
///
/// Bounds WAL replay time on the next startup.
fn spawn_checkpoint(store: WalStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CHECKPOINT_INTERVAL);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            match store.checkpoint().await {
                Ok(seq) => tracing::debug!(seq, "saved checkpoint snapshot"),
                Err(e) => tracing::warn!(error = %e, "failed to save checkpoint snapshot"),
            }
        }
    });
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- nudged: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- nudged: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
