// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory ticket store for tests

use crate::state::{MaterializedState, StoreOp};
use crate::store::{StoreError, TicketStore};
use async_trait::async_trait;
use nudge_core::{TicketId, TicketRecord};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct MemoryState {
    table: MaterializedState,
    ops: Vec<StoreOp>,
    fail_writes: bool,
    write_delay: Option<Duration>,
}

/// [`TicketStore`] held in memory, with failure injection.
///
/// Clones share the same table, so two runtimes built over clones of one
/// store see each other's writes like two daemon runs over one state dir.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records without recording them as writes
    pub fn with_records(records: impl IntoIterator<Item = TicketRecord>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock();
            for record in records {
                inner.table.apply(&StoreOp::Upsert { record });
            }
        }
        store
    }

    /// Make every subsequent upsert/delete fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    /// Delay every subsequent write (real time) before it is applied
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        self.inner.lock().write_delay = delay;
    }

    /// Successful writes, in order
    pub fn ops(&self) -> Vec<StoreOp> {
        self.inner.lock().ops.clone()
    }

    /// Current record for a ticket, synchronously
    pub fn record(&self, id: &str) -> Option<TicketRecord> {
        self.inner.lock().table.get(&TicketId::new(id)).cloned()
    }

    async fn write(&self, op: StoreOp) -> Result<(), StoreError> {
        let (fail, delay) = {
            let inner = self.inner.lock();
            (inner.fail_writes, inner.write_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        let mut inner = self.inner.lock();
        inner.table.apply(&op);
        inner.ops.push(op);
        Ok(())
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn get(&self, id: &TicketId) -> Result<Option<TicketRecord>, StoreError> {
        Ok(self.inner.lock().table.get(id).cloned())
    }

    async fn upsert(&self, record: &TicketRecord) -> Result<(), StoreError> {
        self.write(StoreOp::Upsert {
            record: record.clone(),
        })
        .await
    }

    async fn delete(&self, id: &TicketId) -> Result<bool, StoreError> {
        let existed = self.inner.lock().table.get(id).is_some();
        self.write(StoreOp::Delete { id: id.clone() }).await?;
        Ok(existed)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.lock().table.tickets.len())
    }

    async fn list_all(&self) -> Result<Vec<TicketRecord>, StoreError> {
        Ok(self.inner.lock().table.sorted_records())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
