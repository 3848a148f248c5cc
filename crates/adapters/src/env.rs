// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Upper bound on a single hook invocation (default: 10000ms).
pub fn hook_timeout() -> Duration {
    parse_duration_ms("NUDGE_HOOK_TIMEOUT_MS").unwrap_or(crate::subprocess::HOOK_TIMEOUT)
}
