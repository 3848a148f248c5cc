// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fs2::FileExt;
use nudge_adapters::{HookMessenger, Messenger, TracedMessenger};
use nudge_core::{Clock, SystemClock};
use nudge_engine::{RecoverySummary, Runtime, RuntimeConfig, RuntimeDeps, RuntimeError};
use nudge_storage::{StoreError, TicketStore, WalStore};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{error, info, warn};

/// Daemon runtime with concrete adapter types (wrapped with tracing)
pub type DaemonRuntime = Runtime<TracedMessenger<HookMessenger>, WalStore, SystemClock>;

/// Default timer loop resolution
pub const DEFAULT_TIMER_CHECK: Duration = Duration::from_secs(1);

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/nudge)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to ticket WAL
    pub wal_path: PathBuf,
    /// Path to snapshot file
    pub snapshot_path: PathBuf,
    /// Bridge hook command used for outbound messages
    pub hook: PathBuf,
    pub runtime: RuntimeConfig,
    pub timer_check: Duration,
}

impl Config {
    /// Load configuration from the environment and validate it.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        let hook = crate::env::hook()
            .ok_or_else(|| LifecycleError::Config("NUDGE_HOOK is not set".to_string()))?;
        let intake_bot = crate::env::intake_bot()
            .ok_or_else(|| LifecycleError::Config("NUDGE_INTAKE_BOT is not set".to_string()))?;

        let mut runtime = RuntimeConfig::new(intake_bot, crate::env::alert_roles());
        if let Some(d) = crate::env::pre_delay()? {
            runtime.policy.pre_delay = d;
        }
        if let Some(d) = crate::env::reminder_interval()? {
            runtime.policy.reminder_interval = d;
        }
        if let Some(d) = crate::env::staff_alert_offset()? {
            runtime.policy.staff_alert_offset = d;
        }
        if let Some(t) = crate::env::store_timeout_ms() {
            runtime.store_timeout = t;
        }

        let mut config = Self::new(state_dir, hook, runtime);
        if let Some(t) = crate::env::timer_check_ms() {
            config.timer_check = t;
        }
        config.validate()?;
        Ok(config)
    }

    /// Paths under `state_dir`, default timer resolution
    pub fn new(state_dir: PathBuf, hook: PathBuf, runtime: RuntimeConfig) -> Self {
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            wal_path: state_dir.join("wal").join("tickets.wal"),
            snapshot_path: state_dir.join("snapshot.json"),
            state_dir,
            hook,
            runtime,
            timer_check: DEFAULT_TIMER_CHECK,
        }
    }

    /// Reject settings the daemon cannot run with
    pub fn validate(&self) -> Result<(), LifecycleError> {
        if self.hook.as_os_str().is_empty() {
            return Err(LifecycleError::Config("hook path is empty".to_string()));
        }
        if self.runtime.intake_bot.as_str().is_empty() {
            return Err(LifecycleError::Config("intake bot id is empty".to_string()));
        }
        if self.runtime.alert_roles.is_empty() {
            return Err(LifecycleError::Config(
                "no alert roles configured (NUDGE_ALERT_ROLES)".to_string(),
            ));
        }
        if self.timer_check.is_zero() {
            return Err(LifecycleError::Config("timer check interval is zero".to_string()));
        }
        self.runtime
            .policy
            .validate()
            .map_err(|e| LifecycleError::Config(e.to_string()))
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Shared with the listener and spawned timer tasks
    pub runtime: Arc<DaemonRuntime>,
    /// Ticket store (checkpointed periodically and at shutdown)
    pub store: WalStore,
    pub start_time: Instant,
}

/// Result of daemon startup
pub struct StartupResult {
    pub daemon: DaemonState,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
    pub recovery: RecoverySummary,
}

impl DaemonState {
    /// Dispatch due timers. Returns how many fired.
    pub fn fire_timers(&self) -> usize {
        spawn_fired_timers(&self.runtime)
    }

    /// Shutdown the daemon gracefully.
    ///
    /// Timers are not persisted; the next startup rebuilds them from the
    /// ticket records.
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        match self.store.checkpoint().await {
            Ok(seq) => info!(seq, "saved final shutdown snapshot"),
            Err(e) => warn!("Failed to save shutdown snapshot: {}", e),
        }

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Spawn one task per due timer so a slow or failing callback never holds
/// up other tickets.
pub fn spawn_fired_timers<M, S, C>(runtime: &Arc<Runtime<M, S, C>>) -> usize
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    let events = runtime.fired_timers();
    let count = events.len();
    for event in events {
        let runtime = Arc::clone(runtime);
        tokio::spawn(async move {
            let summary = event.log_summary();
            if let Err(e) = runtime.handle_event(event).await {
                error!(event = %summary, error = %e, "timer callback failed");
            }
        });
    }
    count
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    // Configuration problems are fatal before anything is touched
    config.validate()?;

    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Lock failure means the files belong to a running daemon
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // 1. Acquire lock file FIRST - prevents races
    // Open without truncating so a running daemon's PID survives a failed attempt.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 2. Open the ticket store (snapshot + WAL replay)
    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = WalStore::open(&config.wal_path, &config.snapshot_path)?;

    // 3. Build the runtime and rebuild timers before accepting events
    let messenger = TracedMessenger::new(HookMessenger::new(&config.hook));
    let runtime = Arc::new(Runtime::new(
        RuntimeDeps {
            messenger,
            store: store.clone(),
        },
        SystemClock,
        config.runtime.clone(),
    )?);
    let recovery = runtime.recover().await?;

    // 4. Remove stale socket and bind (LAST - only after recovery)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!("Daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            runtime,
            store,
            start_time: Instant::now(),
        },
        listener,
        recovery,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "../lifecycle_tests.rs"]
mod tests;
