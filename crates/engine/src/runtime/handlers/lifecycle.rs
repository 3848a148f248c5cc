// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket deletion

use super::super::Runtime;
use crate::error::RuntimeError;
use nudge_adapters::Messenger;
use nudge_core::{Clock, TicketId};
use nudge_storage::TicketStore;

impl<M, S, C> Runtime<M, S, C>
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    pub(crate) async fn handle_ticket_deleted(&self, ticket: &TicketId) -> Result<(), RuntimeError> {
        let existed = self.forget(ticket).await?;
        tracing::info!(ticket_id = %ticket, existed, "ticket deleted");
        Ok(())
    }
}
