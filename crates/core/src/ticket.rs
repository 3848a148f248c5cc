// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket records and the derived lifecycle state.

use crate::id::{TicketId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable per-ticket record.
///
/// `timer_start_ms` marks when the active countdown began (after the
/// pre-delay), not when staff sent the triggering message. `None` means no
/// countdown is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: TicketId,
    pub creator_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_start_ms: Option<u64>,
    /// Reminders sent since the countdown last (re)started
    #[serde(default)]
    pub reminder_count: u32,
    /// Set once the staff alert fired for the current countdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerted_at_ms: Option<u64>,
}

impl TicketRecord {
    /// New idle record owned by `creator_id`
    pub fn new(id: TicketId, creator_id: UserId) -> Self {
        Self {
            id,
            creator_id,
            timer_start_ms: None,
            reminder_count: 0,
            alerted_at_ms: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer_start_ms.is_some()
    }

    pub fn is_escalated(&self) -> bool {
        self.alerted_at_ms.is_some()
    }

    /// Begin a fresh countdown epoch at `now_ms`
    pub fn start_timer(&mut self, now_ms: u64) {
        self.timer_start_ms = Some(now_ms);
        self.reminder_count = 0;
        self.alerted_at_ms = None;
    }

    /// Back to idle. Returns false if there was nothing to clear.
    pub fn clear_timer(&mut self) -> bool {
        let had_timer = self.is_running() || self.reminder_count > 0;
        self.timer_start_ms = None;
        self.reminder_count = 0;
        self.alerted_at_ms = None;
        had_timer
    }

    /// Count one more reminder; returns the new count, or `None` if no countdown is running.
    pub fn record_reminder(&mut self) -> Option<u32> {
        self.timer_start_ms?;
        self.reminder_count = self.reminder_count.saturating_add(1);
        Some(self.reminder_count)
    }

    /// Raise the reminder count to at least `due`. Returns true if it changed.
    pub fn reconcile_reminders(&mut self, due: u32) -> bool {
        if self.timer_start_ms.is_none() || self.reminder_count >= due {
            return false;
        }
        self.reminder_count = due;
        true
    }

    /// Mark the staff alert as sent for this epoch.
    ///
    /// Returns false when the alert was already recorded or no countdown is
    /// running, so callers can make the alert exactly-once.
    pub fn record_alert(&mut self, now_ms: u64) -> bool {
        if self.timer_start_ms.is_none() || self.alerted_at_ms.is_some() {
            return false;
        }
        self.alerted_at_ms = Some(now_ms);
        true
    }

    /// Milliseconds since the countdown started
    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        self.timer_start_ms.map(|start| now_ms.saturating_sub(start))
    }

    /// `reminder_count > 0` and an alert both require a running countdown
    pub fn invariants_hold(&self) -> bool {
        (self.reminder_count == 0 || self.timer_start_ms.is_some())
            && (self.alerted_at_ms.is_none() || self.timer_start_ms.is_some())
    }
}

/// Lifecycle state of a ticket.
///
/// Derived from the durable record plus whether a pre-delay timer is armed,
/// so the live engine and startup recovery always agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    Untracked,
    Idle,
    PendingStart,
    Active,
    Escalated,
}

impl TicketState {
    pub fn derive(record: Option<&TicketRecord>, pending_start: bool) -> Self {
        match record {
            None => TicketState::Untracked,
            Some(r) if r.is_escalated() => TicketState::Escalated,
            Some(r) if r.is_running() => TicketState::Active,
            Some(_) if pending_start => TicketState::PendingStart,
            Some(_) => TicketState::Idle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TicketState::Untracked => "untracked",
            TicketState::Idle => "idle",
            TicketState::PendingStart => "pending",
            TicketState::Active => "active",
            TicketState::Escalated => "escalated",
        }
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "ticket_tests.rs"]
mod tests;
