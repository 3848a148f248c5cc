// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so timing logic can run against simulated time.
//!
//! The engine needs two views of time: a monotonic [`Instant`] for timer
//! deadlines and wall-clock epoch milliseconds for anything persisted
//! (a persisted `Instant` means nothing after a restart).

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic and wall-clock time
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic now, used for timer deadlines
    fn now(&self) -> Instant;

    /// Wall-clock milliseconds since the Unix epoch, used for persisted timestamps
    fn epoch_ms(&self) -> u64;
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Epoch the fake clock starts at (2023-11-14T22:13:20Z)
const FAKE_EPOCH_START_MS: u64 = 1_700_000_000_000;

#[derive(Debug)]
struct FakeClockState {
    now: Instant,
    epoch_ms: u64,
}

/// Manually driven clock for tests.
///
/// Clones share the same underlying time, so a runtime and the test that
/// drives it observe identical advances.
#[derive(Debug, Clone)]
pub struct FakeClock {
    state: Arc<Mutex<FakeClockState>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeClockState {
                now: Instant::now(),
                epoch_ms: FAKE_EPOCH_START_MS,
            })),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move both monotonic and wall-clock time forward
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.now += duration;
        state.epoch_ms += duration.as_millis() as u64;
    }

    /// Set wall-clock time without touching monotonic time
    pub fn set_epoch_ms(&self, epoch_ms: u64) {
        self.state.lock().epoch_ms = epoch_ms;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.state.lock().now
    }

    fn epoch_ms(&self) -> u64 {
        self.state.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
