// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: NUDGE_STATE_DIR > XDG_STATE_HOME/nudge > ~/.local/state/nudge
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("NUDGE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("nudge"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/nudge"))
}

/// Bridge hook command
pub fn hook() -> Option<PathBuf> {
    non_empty("NUDGE_HOOK").map(PathBuf::from)
}

/// User id of the intake bot
pub fn intake_bot() -> Option<String> {
    non_empty("NUDGE_INTAKE_BOT")
}

/// Comma-separated role refs pinged by staff alerts
pub fn alert_roles() -> Vec<String> {
    non_empty("NUDGE_ALERT_ROLES")
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

pub fn pre_delay() -> Result<Option<Duration>, LifecycleError> {
    secs("NUDGE_PRE_DELAY_SECS")
}

pub fn reminder_interval() -> Result<Option<Duration>, LifecycleError> {
    secs("NUDGE_REMINDER_INTERVAL_SECS")
}

pub fn staff_alert_offset() -> Result<Option<Duration>, LifecycleError> {
    secs("NUDGE_STAFF_ALERT_SECS")
}

/// Timer check interval override
pub fn timer_check_ms() -> Option<Duration> {
    std::env::var("NUDGE_TIMER_CHECK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Store call timeout override
pub fn store_timeout_ms() -> Option<Duration> {
    std::env::var("NUDGE_STORE_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Whole seconds. A malformed value is a config error.
fn secs(var: &'static str) -> Result<Option<Duration>, LifecycleError> {
    let Some(raw) = non_empty(var) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(|s| Some(Duration::from_secs(s)))
        .map_err(|_| LifecycleError::Config(format!("{var} must be a whole number of seconds, got {raw:?}")))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
