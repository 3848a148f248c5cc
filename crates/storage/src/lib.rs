// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable ticket record storage

mod snapshot;
mod state;
mod store;
mod wal;

#[cfg(any(test, feature = "test-support"))]
mod memory;

pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{MaterializedState, StoreOp};
pub use store::{StoreError, TicketStore, WalStore};
pub use wal::{Wal, WalEntry, WalError};

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
