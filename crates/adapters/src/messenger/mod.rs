// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound messaging to ticket channels

mod hook;

pub use hook::HookMessenger;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMessenger, MessengerCall};

use async_trait::async_trait;
use nudge_core::TicketId;
use thiserror::Error;

/// Errors from messenger operations
#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("ticket channel {0} no longer exists")]
    TicketGone(TicketId),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("lookup failed: {0}")]
    LookupFailed(String),
}

/// Chat platform operations the engine needs.
///
/// Delivery is best effort. Callers log failures and carry on.
#[async_trait]
pub trait Messenger: Clone + Send + Sync + 'static {
    /// Post `content` in the ticket's channel
    async fn send_message(&self, ticket: &TicketId, content: &str) -> Result<(), MessengerError>;

    /// Post a staff alert, pinging `roles`
    async fn send_alert(
        &self,
        ticket: &TicketId,
        roles: &[String],
        content: &str,
    ) -> Result<(), MessengerError>;

    /// Whether the ticket's channel still exists
    async fn ticket_exists(&self, ticket: &TicketId) -> Result<bool, MessengerError>;
}
