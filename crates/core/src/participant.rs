// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message authors and their roles in a ticket.
//!
//! Roles are classified by the chat bridge before events reach the engine;
//! the engine only ever asks "is this staff?" and "is this a bot?".

use crate::id::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user relative to a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Holds the staff role
    Staff,
    /// Holds the second elevated (management) role
    Privileged,
    /// Ordinary human user
    Requester,
    /// Any bot account
    Bot,
}

impl Role {
    /// Staff-privileged: either of the two elevated roles.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Staff | Role::Privileged)
    }

    pub fn is_bot(self) -> bool {
        matches!(self, Role::Bot)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Privileged => "privileged",
            Role::Requester => "requester",
            Role::Bot => "bot",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user together with their classified role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    pub role: Role,
}

impl Participant {
    pub fn new(id: impl Into<UserId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// A human without elevated roles, eligible to own a ticket
    pub fn is_requester(&self) -> bool {
        !self.role.is_staff() && !self.role.is_bot()
    }
}

#[cfg(test)]
#[path = "participant_tests.rs"]
mod tests;
