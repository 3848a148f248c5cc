// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized ticket state built from WAL operations

use nudge_core::{TicketId, TicketRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single mutation of the ticket table, as written to the WAL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreOp {
    #[serde(rename = "ticket:upsert")]
    Upsert { record: TicketRecord },

    #[serde(rename = "ticket:delete")]
    Delete { id: TicketId },
}

impl StoreOp {
    pub fn ticket_id(&self) -> &TicketId {
        match self {
            StoreOp::Upsert { record } => &record.id,
            StoreOp::Delete { id } => id,
        }
    }
}

/// Current ticket table. At most one record per ticket id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedState {
    #[serde(default)]
    pub tickets: HashMap<TicketId, TicketRecord>,
}

impl MaterializedState {
    /// Apply one operation. Replaying the same op twice yields the same state.
    pub fn apply(&mut self, op: &StoreOp) {
        match op {
            StoreOp::Upsert { record } => {
                self.tickets.insert(record.id.clone(), record.clone());
            }
            StoreOp::Delete { id } => {
                self.tickets.remove(id);
            }
        }
    }

    pub fn get(&self, id: &TicketId) -> Option<&TicketRecord> {
        self.tickets.get(id)
    }

    /// All records ordered by ticket id
    pub fn sorted_records(&self) -> Vec<TicketRecord> {
        let mut records: Vec<_> = self.tickets.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
