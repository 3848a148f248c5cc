// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identity.
//!
//! Every scheduled callback is addressed by `(ticket, kind)`, so each ticket
//! has at most one live timer per kind. The string form
//! (`reminder:<ticket>`) is what appears in logs and on the wire.

use crate::id::TicketId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The three timers a ticket can have armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Fires once after the pre-delay following a staff message
    PendingStart,
    /// Fires every reminder interval while the countdown is active
    Reminder,
    /// Fires once at the staff-alert offset from the countdown start
    StaffAlert,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [
        TimerKind::PendingStart,
        TimerKind::Reminder,
        TimerKind::StaffAlert,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            TimerKind::PendingStart => "pending-start",
            TimerKind::Reminder => "reminder",
            TimerKind::StaffAlert => "staff-alert",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }
}

/// Identity of a scheduled timer
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TimerId {
    pub ticket: TicketId,
    pub kind: TimerKind,
}

impl TimerId {
    pub fn new(ticket: TicketId, kind: TimerKind) -> Self {
        Self { ticket, kind }
    }

    pub fn pending_start(ticket: &TicketId) -> Self {
        Self::new(ticket.clone(), TimerKind::PendingStart)
    }

    pub fn reminder(ticket: &TicketId) -> Self {
        Self::new(ticket.clone(), TimerKind::Reminder)
    }

    pub fn staff_alert(ticket: &TicketId) -> Self {
        Self::new(ticket.clone(), TimerKind::StaffAlert)
    }

    /// Parse the `kind:ticket` string form
    pub fn parse(s: &str) -> Option<Self> {
        let (prefix, ticket) = s.split_once(':')?;
        if ticket.is_empty() {
            return None;
        }
        let kind = TimerKind::from_prefix(prefix)?;
        Some(Self::new(TicketId::new(ticket), kind))
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.ticket)
    }
}

impl From<TimerId> for String {
    fn from(id: TimerId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for TimerId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("malformed timer id: {}", s))
    }
}

/// When an armed timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// Fire once after the delay
    Once {
        #[serde(with = "duration_ms")]
        after: Duration,
    },
    /// Fire after `first`, then every `period`
    Every {
        #[serde(with = "duration_ms")]
        first: Duration,
        #[serde(with = "duration_ms")]
        period: Duration,
    },
}

impl Schedule {
    pub fn once(after: Duration) -> Self {
        Schedule::Once { after }
    }

    /// Repeating schedule whose first firing is one full period away
    pub fn every(period: Duration) -> Self {
        Schedule::Every {
            first: period,
            period,
        }
    }

    pub fn first_delay(&self) -> Duration {
        match self {
            Schedule::Once { after } => *after,
            Schedule::Every { first, .. } => *first,
        }
    }

    pub fn period(&self) -> Option<Duration> {
        match self {
            Schedule::Once { .. } => None,
            Schedule::Every { period, .. } => Some(*period),
        }
    }
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (duration.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
