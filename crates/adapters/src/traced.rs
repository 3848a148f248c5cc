// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::messenger::{Messenger, MessengerError};
use async_trait::async_trait;
use nudge_core::TicketId;
use tracing::Instrument;

/// Wrapper that adds tracing to any Messenger
#[derive(Clone)]
pub struct TracedMessenger<M> {
    inner: M,
}

impl<M> TracedMessenger<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

#[async_trait]
impl<M: Messenger> Messenger for TracedMessenger<M> {
    async fn send_message(&self, ticket: &TicketId, content: &str) -> Result<(), MessengerError> {
        async {
            tracing::info!(len = content.len(), "sending");
            let start = std::time::Instant::now();
            let result = self.inner.send_message(ticket, content).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "message sent"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "send failed"),
            }
            result
        }
        .instrument(tracing::info_span!("messenger.send", ticket = %ticket))
        .await
    }

    async fn send_alert(
        &self,
        ticket: &TicketId,
        roles: &[String],
        content: &str,
    ) -> Result<(), MessengerError> {
        async {
            tracing::info!(roles = roles.len(), "alerting");
            let start = std::time::Instant::now();
            let result = self.inner.send_alert(ticket, roles, content).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "alert sent"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "alert failed"),
            }
            result
        }
        .instrument(tracing::info_span!("messenger.alert", ticket = %ticket))
        .await
    }

    async fn ticket_exists(&self, ticket: &TicketId) -> Result<bool, MessengerError> {
        let result = self.inner.ticket_exists(ticket).await;
        tracing::info_span!("messenger.exists", ticket = %ticket).in_scope(|| match &result {
            Ok(exists) => tracing::debug!(exists, "checked"),
            Err(e) => tracing::warn!(error = %e, "lookup failed"),
        });
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
