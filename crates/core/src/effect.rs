// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the engine needs to perform

use crate::id::TicketId;
use crate::timer::{Schedule, TimerId};
use serde::{Deserialize, Serialize};

/// Effects that need to be executed by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    // === Timer effects ===
    /// Arm (or re-arm) a timer
    SetTimer { id: TimerId, schedule: Schedule },

    /// Cancel a timer
    CancelTimer { id: TimerId },

    /// Cancel every timer belonging to a ticket
    CancelTicketTimers { ticket_id: TicketId },

    // === Chat effects ===
    /// Post a reminder in the ticket channel
    SendReminder { ticket_id: TicketId, content: String },

    /// Post a staff alert in the ticket channel, pinging `roles`
    SendAlert {
        ticket_id: TicketId,
        roles: Vec<String>,
        content: String,
    },
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::CancelTicketTimers { .. } => "cancel_ticket_timers",
            Effect::SendReminder { .. } => "send_reminder",
            Effect::SendAlert { .. } => "send_alert",
        }
    }

    /// Key/value pairs for the effect's tracing span
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::SetTimer { id, schedule } => {
                let mut fields = vec![
                    ("timer_id", id.to_string()),
                    (
                        "first_ms",
                        (schedule.first_delay().as_millis() as u64).to_string(),
                    ),
                ];
                if let Some(period) = schedule.period() {
                    fields.push(("period_ms", (period.as_millis() as u64).to_string()));
                }
                fields
            }
            Effect::CancelTimer { id } => vec![("timer_id", id.to_string())],
            Effect::CancelTicketTimers { ticket_id } => vec![("ticket_id", ticket_id.to_string())],
            Effect::SendReminder { ticket_id, content } => vec![
                ("ticket_id", ticket_id.to_string()),
                ("len", content.len().to_string()),
            ],
            Effect::SendAlert {
                ticket_id, roles, ..
            } => vec![
                ("ticket_id", ticket_id.to_string()),
                ("roles", roles.join(",")),
            ],
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
