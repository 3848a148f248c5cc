// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staff commands and their replies

use nudge_core::{notice, TicketId, TicketState, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `timer {stop|restart|status}` and `creator {check|assign <user>}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TicketCommand {
    TimerStop,
    TimerRestart,
    TimerStatus,
    CreatorCheck,
    CreatorAssign { user: UserId },
}

impl TicketCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TicketCommand::TimerStop => "timer stop",
            TicketCommand::TimerRestart => "timer restart",
            TicketCommand::TimerStatus => "timer status",
            TicketCommand::CreatorCheck => "creator check",
            TicketCommand::CreatorAssign { .. } => "creator assign",
        }
    }
}

/// Snapshot of one ticket for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStatus {
    pub ticket_id: TicketId,
    pub state: TicketState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    pub reminder_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerted_at_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum CommandReply {
    /// Invoker lacks a staff role
    Denied,
    Stopped,
    /// Stop on a ticket with no running or pending timer
    NotRunning,
    Restarted { started_at_ms: u64 },
    NotTracked,
    Status(TicketStatus),
    Creator { creator_id: UserId },
    CreatorAssigned {
        creator_id: UserId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<UserId>,
    },
}

impl CommandReply {
    /// Text posted back to the invoker
    pub fn message(&self) -> String {
        match self {
            CommandReply::Denied => notice::PERMISSION_DENIED.to_string(),
            CommandReply::Stopped => "Timer stopped.".to_string(),
            CommandReply::NotRunning => "No timer is running.".to_string(),
            CommandReply::Restarted { .. } => {
                "Timer restarted. Reminders resume on the normal schedule.".to_string()
            }
            CommandReply::NotTracked => notice::creator_status(None),
            CommandReply::Status(status) => notice::timer_status(
                status.state,
                status.elapsed_ms.map(Duration::from_millis),
                status.reminder_count,
            ),
            CommandReply::Creator { creator_id } => notice::creator_status(Some(creator_id)),
            CommandReply::CreatorAssigned { creator_id, .. } => {
                format!("Ticket creator set to {}.", notice::mention(creator_id))
            }
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
