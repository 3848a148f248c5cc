// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events fed into the lifecycle engine

use crate::id::TicketId;
use crate::participant::Participant;
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};

/// Inputs that drive ticket state transitions.
///
/// Serializes with `{"type": "event:name", ...fields}` format.
/// Unknown type tags deserialize to `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A message was posted in a ticket channel
    #[serde(rename = "ticket:message")]
    Message {
        ticket_id: TicketId,
        author: Participant,
        /// Users mentioned in the message, in message order
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        mentions: Vec<Participant>,
    },

    /// The ticket's channel was deleted on the chat platform
    #[serde(rename = "ticket:deleted")]
    TicketDeleted { ticket_id: TicketId },

    /// A scheduled timer reached its deadline
    #[serde(rename = "timer:fired")]
    TimerFired { id: TimerId, generation: u64 },

    /// Catch-all for unknown event types (extensibility)
    #[serde(other, skip_serializing)]
    Custom,
}

impl Event {
    pub fn name(&self) -> &str {
        match self {
            Event::Message { .. } => "ticket:message",
            Event::TicketDeleted { .. } => "ticket:deleted",
            Event::TimerFired { .. } => "timer:fired",
            Event::Custom => "custom",
        }
    }

    pub fn ticket_id(&self) -> Option<&TicketId> {
        match self {
            Event::Message { ticket_id, .. } | Event::TicketDeleted { ticket_id } => {
                Some(ticket_id)
            }
            Event::TimerFired { id, .. } => Some(&id.ticket),
            Event::Custom => None,
        }
    }

    /// One-line summary for logs
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::Message {
                ticket_id,
                author,
                mentions,
            } => format!(
                "{t} ticket={ticket_id} author={} role={} mentions={}",
                author.id,
                author.role,
                mentions.len()
            ),
            Event::TicketDeleted { ticket_id } => format!("{t} ticket={ticket_id}"),
            Event::TimerFired { id, generation } => format!("{t} id={id} gen={generation}"),
            Event::Custom => t.to_string(),
        }
    }
}

/// First mentioned user who is neither staff nor a bot.
///
/// Used to attribute tickets opened by the intake bot, which mentions the
/// requester in its opening message.
pub fn first_non_staff_mention(mentions: &[Participant]) -> Option<&Participant> {
    mentions.iter().find(|p| p.is_requester())
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
