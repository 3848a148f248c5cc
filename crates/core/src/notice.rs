// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing message copy.

use crate::id::UserId;
use crate::ticket::TicketState;
use crate::time_fmt::format_elapsed;
use std::time::Duration;

/// Fixed reply for ticket commands invoked without a staff role
pub const PERMISSION_DENIED: &str = "You do not have permission to use this command.";

/// Chat mention for a user
pub fn mention(user: &UserId) -> String {
    format!("<@{}>", user)
}

/// Chat mention for a role
pub fn role_mention(role: &str) -> String {
    format!("<@&{}>", role)
}

/// Reminder sent to the requester while staff waits on a reply
pub fn reminder(creator: &UserId, elapsed: Duration, final_warning: bool) -> String {
    let waited = format_elapsed(elapsed.as_secs());
    if final_warning {
        format!(
            "{} **Final reminder:** staff has been waiting {} for your reply. \
             If you do not respond soon, this ticket will be escalated to the team.",
            mention(creator),
            waited
        )
    } else {
        format!(
            "{} Reminder: staff replied {} ago and is waiting for your response.",
            mention(creator),
            waited
        )
    }
}

/// Escalation notice sent to the alert roles
pub fn staff_alert(creator: &UserId, roles: &[String], elapsed: Duration) -> String {
    let roles = roles
        .iter()
        .map(|r| role_mention(r))
        .collect::<Vec<_>>()
        .join(" ");
    let waited = format_elapsed(elapsed.as_secs());
    if roles.is_empty() {
        format!(
            "{} has not replied in {}. This ticket needs staff attention.",
            mention(creator),
            waited
        )
    } else {
        format!(
            "{} {} has not replied in {}. This ticket needs staff attention.",
            roles,
            mention(creator),
            waited
        )
    }
}

/// One-line timer status for the `timer status` command
pub fn timer_status(state: TicketState, elapsed: Option<Duration>, reminders: u32) -> String {
    match (state, elapsed) {
        (TicketState::Untracked, _) => "This channel is not a tracked ticket.".to_string(),
        (TicketState::Idle, _) => "No timer is running.".to_string(),
        (TicketState::PendingStart, _) => {
            "Timer pending: it starts shortly unless the requester replies.".to_string()
        }
        (TicketState::Active, Some(elapsed)) => format!(
            "Timer running for {}, {} reminder(s) sent.",
            format_elapsed(elapsed.as_secs()),
            reminders
        ),
        (TicketState::Escalated, Some(elapsed)) => format!(
            "Escalated to staff. Timer started {} ago, {} reminder(s) sent.",
            format_elapsed(elapsed.as_secs()),
            reminders
        ),
        (TicketState::Active | TicketState::Escalated, None) => format!("Timer {}.", state),
    }
}

/// Reply for `creator check`
pub fn creator_status(creator: Option<&UserId>) -> String {
    match creator {
        Some(user) => format!("Ticket creator: {}", mention(user)),
        None => "This channel is not a tracked ticket.".to_string(),
    }
}

#[cfg(test)]
#[path = "notice_tests.rs"]
mod tests;
