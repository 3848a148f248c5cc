// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat message handling

use super::super::Runtime;
use crate::error::RuntimeError;
use nudge_adapters::Messenger;
use nudge_core::event::first_non_staff_mention;
use nudge_core::{Clock, Effect, Participant, TicketId, TicketRecord, TimerId, UserId};
use nudge_core::Schedule;
use nudge_storage::TicketStore;

impl<M, S, C> Runtime<M, S, C>
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    pub(crate) async fn handle_message(
        &self,
        ticket: &TicketId,
        author: &Participant,
        mentions: &[Participant],
    ) -> Result<(), RuntimeError> {
        let Some(record) = self.load(ticket).await? else {
            return self.track_ticket(ticket, author, mentions).await;
        };

        // Staff identity wins even when staff is the recorded creator
        if author.is_staff() {
            return self.arm_pending_start(record).await;
        }
        if author.id == record.creator_id && !author.role.is_bot() {
            return self.requester_replied(record).await;
        }

        tracing::debug!(ticket_id = %ticket, author = %author.id, "message ignored");
        Ok(())
    }

    /// Who opened the ticket, judging from its first qualifying message
    pub(crate) fn qualify_creator(
        &self,
        author: &Participant,
        mentions: &[Participant],
    ) -> Option<UserId> {
        if author.id == self.config.intake_bot {
            return first_non_staff_mention(mentions).map(|p| p.id.clone());
        }
        author.is_requester().then(|| author.id.clone())
    }

    async fn track_ticket(
        &self,
        ticket: &TicketId,
        author: &Participant,
        mentions: &[Participant],
    ) -> Result<(), RuntimeError> {
        let Some(creator) = self.qualify_creator(author, mentions) else {
            tracing::debug!(ticket_id = %ticket, author = %author.id, "no creator, ticket stays untracked");
            return Ok(());
        };

        let record = TicketRecord::new(ticket.clone(), creator);
        self.persist(&record).await?;
        tracing::info!(ticket_id = %ticket, creator = %record.creator_id, "ticket tracked");
        Ok(())
    }

    /// Staff spoke: drop any countdown and restart the pre-delay window
    async fn arm_pending_start(&self, mut record: TicketRecord) -> Result<(), RuntimeError> {
        if record.clear_timer() {
            self.persist(&record).await?;
        }

        let ticket = record.id;
        tracing::info!(ticket_id = %ticket, "staff message, countdown pending");
        self.execute_all(vec![
            Effect::CancelTicketTimers {
                ticket_id: ticket.clone(),
            },
            Effect::SetTimer {
                id: TimerId::pending_start(&ticket),
                schedule: Schedule::once(self.config.policy.pre_delay),
            },
        ])
        .await
    }

    /// The creator answered: back to idle
    async fn requester_replied(&self, mut record: TicketRecord) -> Result<(), RuntimeError> {
        let was_running = record.clear_timer();
        if was_running {
            self.persist(&record).await?;
        }

        tracing::info!(ticket_id = %record.id, was_running, "requester replied, timer cleared");
        self.execute_all(vec![Effect::CancelTicketTimers {
            ticket_id: record.id,
        }])
        .await
    }
}
