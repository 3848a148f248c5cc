// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Event, Participant, Role, TicketId, TicketRecord, UserId};

// ── Event factory functions ─────────────────────────────────────────────────

pub fn message_event(ticket: &str, author: &str, role: Role) -> Event {
    Event::Message {
        ticket_id: TicketId::new(ticket),
        author: Participant::new(author, role),
        mentions: Vec::new(),
    }
}

pub fn staff_message(ticket: &str, author: &str) -> Event {
    message_event(ticket, author, Role::Staff)
}

pub fn requester_message(ticket: &str, author: &str) -> Event {
    message_event(ticket, author, Role::Requester)
}

/// Opening message from the intake bot, mentioning users in order
pub fn intake_message(ticket: &str, bot: &str, mentions: &[(&str, Role)]) -> Event {
    Event::Message {
        ticket_id: TicketId::new(ticket),
        author: Participant::new(bot, Role::Bot),
        mentions: mentions
            .iter()
            .map(|(id, role)| Participant::new(*id, *role))
            .collect(),
    }
}

pub fn ticket_deleted(ticket: &str) -> Event {
    Event::TicketDeleted {
        ticket_id: TicketId::new(ticket),
    }
}

// ── Record builders ─────────────────────────────────────────────────────────

pub fn idle_record(ticket: &str, creator: &str) -> TicketRecord {
    TicketRecord::new(TicketId::new(ticket), UserId::new(creator))
}

pub fn running_record(ticket: &str, creator: &str, started_ms: u64, reminders: u32) -> TicketRecord {
    let mut record = idle_record(ticket, creator);
    record.start_timer(started_ms);
    record.reminder_count = reminders;
    record
}
