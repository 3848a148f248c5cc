// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between the chat bridge and the daemon.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

use nudge_core::{Event, Participant, TicketId};
use nudge_engine::{CommandReply, TicketCommand, TicketStatus};
use serde::{Deserialize, Serialize};

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    call, decode, encode, read_frame, read_request, write_frame, write_response, ProtocolError,
    DEFAULT_TIMEOUT, MAX_FRAME_SIZE,
};

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request from the bridge to the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Deliver a chat event to the engine
    Event { event: Event },

    /// Run a staff command against a ticket
    Command {
        ticket_id: TicketId,
        invoker: Participant,
        command: TicketCommand,
    },

    /// Current state of one ticket
    TicketStatus { ticket_id: TicketId },

    /// Daemon status
    Status,

    /// Request daemon shutdown
    Shutdown,
}

impl Request {
    /// Frequent, read-only requests logged at debug level
    pub fn is_poll(&self) -> bool {
        matches!(
            self,
            Request::Ping | Request::Status | Request::TicketStatus { .. }
        )
    }
}

/// Response from the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Response to Ping
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Command outcome, with the text to post back to the invoker
    Command { reply: CommandReply, message: String },

    TicketStatus { status: TicketStatus },

    /// Daemon status
    Status {
        uptime_secs: u64,
        tickets: usize,
        timers: usize,
    },

    /// Daemon is shutting down
    ShuttingDown,

    /// Error response
    Error { message: String },
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
