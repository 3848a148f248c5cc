// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event handling for the runtime

mod command;
mod lifecycle;
mod message;
mod timer;

use super::Runtime;
use crate::error::RuntimeError;
use nudge_adapters::Messenger;
use nudge_core::{Clock, Event};
use nudge_storage::TicketStore;

impl<M, S, C> Runtime<M, S, C>
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    /// Handle one inbound event under its ticket's lock
    pub async fn handle_event(&self, event: Event) -> Result<(), RuntimeError> {
        let Some(ticket) = event.ticket_id().cloned() else {
            tracing::debug!(event = event.name(), "ignoring event without a ticket");
            return Ok(());
        };
        tracing::debug!(event = %event.log_summary(), "handling");

        let guard = self.locks.lock(&ticket).await;
        let result = match event {
            Event::Message {
                ticket_id,
                author,
                mentions,
            } => self.handle_message(&ticket_id, &author, &mentions).await,
            Event::TicketDeleted { ticket_id } => self.handle_ticket_deleted(&ticket_id).await,
            Event::TimerFired { id, generation } => self.handle_timer_fired(&id, generation).await,
            Event::Custom => Ok(()),
        };
        drop(guard);

        self.release_lock(&ticket);
        result
    }
}
