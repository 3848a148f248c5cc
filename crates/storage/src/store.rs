// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket store trait and the WAL-backed implementation

use crate::snapshot::{Snapshot, SnapshotError};
use crate::state::{MaterializedState, StoreOp};
use crate::wal::{Wal, WalError};
use async_trait::async_trait;
use nudge_core::{TicketId, TicketRecord};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("wal error: {0}")]
    Wal(#[from] WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("store task failed: {0}")]
    Task(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable map from ticket id to [`TicketRecord`].
///
/// A successful `upsert` or `delete` is durable when it returns.
#[async_trait]
pub trait TicketStore: Clone + Send + Sync + 'static {
    async fn get(&self, id: &TicketId) -> Result<Option<TicketRecord>, StoreError>;

    /// Insert or replace the record keyed by `record.id`
    async fn upsert(&self, record: &TicketRecord) -> Result<(), StoreError>;

    /// Remove a record. Returns false when there was none.
    async fn delete(&self, id: &TicketId) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn list_all(&self) -> Result<Vec<TicketRecord>, StoreError>;
}

struct Inner {
    wal: Wal,
    state: MaterializedState,
    snapshot_path: PathBuf,
}

impl Inner {
    fn write(&mut self, op: StoreOp) -> Result<(), StoreError> {
        self.wal.append(&op)?;
        self.state.apply(&op);
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<u64, StoreError> {
        let seq = self.wal.write_seq();
        Snapshot::new(seq, self.state.clone()).save(&self.snapshot_path)?;
        self.wal.truncate_before(seq + 1)?;
        Ok(seq)
    }
}

/// [`TicketStore`] backed by a JSONL WAL and periodic snapshots.
///
/// Reads are served from memory. Writes append to the WAL (fsynced) on a
/// blocking thread, then update the in-memory table.
#[derive(Clone)]
pub struct WalStore {
    inner: Arc<Mutex<Inner>>,
}

impl WalStore {
    /// Load the snapshot (if any), replay the WAL on top, and open for writes.
    pub fn open(wal_path: &Path, snapshot_path: &Path) -> Result<Self, StoreError> {
        let (seq, mut state) = match Snapshot::load(snapshot_path)? {
            Some(snapshot) => (snapshot.seq, snapshot.state),
            None => (0, MaterializedState::default()),
        };

        let wal = Wal::open(wal_path, seq)?;
        let entries = wal.entries_after(seq)?;
        let replayed = entries.len();
        for entry in entries {
            state.apply(&entry.op);
        }

        tracing::info!(
            snapshot_seq = seq,
            replayed,
            tickets = state.tickets.len(),
            "ticket store opened"
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                wal,
                state,
                snapshot_path: snapshot_path.to_owned(),
            })),
        })
    }

    /// Snapshot the table and drop WAL entries it covers. Returns the
    /// sequence number the snapshot covers.
    pub async fn checkpoint(&self) -> Result<u64, StoreError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.lock().checkpoint())
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    async fn write(&self, op: StoreOp) -> Result<(), StoreError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.lock().write(op))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl TicketStore for WalStore {
    async fn get(&self, id: &TicketId) -> Result<Option<TicketRecord>, StoreError> {
        Ok(self.inner.lock().state.get(id).cloned())
    }

    async fn upsert(&self, record: &TicketRecord) -> Result<(), StoreError> {
        self.write(StoreOp::Upsert {
            record: record.clone(),
        })
        .await
    }

    async fn delete(&self, id: &TicketId) -> Result<bool, StoreError> {
        if self.inner.lock().state.get(id).is_none() {
            return Ok(false);
        }
        self.write(StoreOp::Delete { id: id.clone() }).await?;
        Ok(true)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.lock().state.tickets.len())
    }

    async fn list_all(&self) -> Result<Vec<TicketRecord>, StoreError> {
        Ok(self.inner.lock().state.sorted_records())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
