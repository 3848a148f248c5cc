// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-ticket mutual exclusion.
//!
//! Each ticket gets its own async mutex. Handlers hold it across the whole
//! read, persist, and re-arm sequence. Distinct tickets never share a lock.

use nudge_core::TicketId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

type TicketMutex = Arc<tokio::sync::Mutex<()>>;

#[derive(Clone, Default)]
pub struct TicketLocks {
    inner: Arc<Mutex<HashMap<TicketId, TicketMutex>>>,
}

impl TicketLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `ticket`
    pub async fn lock(&self, ticket: &TicketId) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock();
            Arc::clone(map.entry(ticket.clone()).or_default())
        };
        mutex.lock_owned().await
    }

    /// Drop the entry for `ticket` if nobody holds or awaits it.
    ///
    /// Call after releasing the guard. Lockers clone the mutex while the map
    /// is locked, so a count of one here means no one else can reach it.
    pub fn prune(&self, ticket: &TicketId) -> bool {
        let mut map = self.inner.lock();
        match map.get(ticket) {
            Some(mutex) if Arc::strong_count(mutex) == 1 => {
                map.remove(ticket);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
