// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer event handling

use super::super::Runtime;
use crate::error::RuntimeError;
use nudge_adapters::Messenger;
use nudge_core::{notice, Clock, Effect, TicketId, TicketRecord, TimerId, TimerKind};
use nudge_storage::TicketStore;
use std::time::Duration;

impl<M, S, C> Runtime<M, S, C>
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    /// Route a timer firing by kind, after checking it is still current
    pub(crate) async fn handle_timer_fired(
        &self,
        id: &TimerId,
        generation: u64,
    ) -> Result<(), RuntimeError> {
        let claimed = self.executor.scheduler().lock().claim(id, generation);
        if !claimed {
            tracing::debug!(timer_id = %id, generation, "discarding stale timer firing");
            return Ok(());
        }

        match id.kind {
            TimerKind::PendingStart => self.handle_pending_start(&id.ticket).await,
            TimerKind::Reminder => self.handle_reminder(&id.ticket).await,
            TimerKind::StaffAlert => self.handle_staff_alert(&id.ticket).await,
        }
    }

    /// Pre-delay elapsed: the countdown becomes active
    async fn handle_pending_start(&self, ticket: &TicketId) -> Result<(), RuntimeError> {
        let Some(mut record) = self.load(ticket).await? else {
            return Ok(());
        };

        record.start_timer(self.clock().epoch_ms());
        self.persist(&record).await?;

        let policy = &self.config.policy;
        tracing::info!(ticket_id = %ticket, "countdown started");
        self.execute_all(self.countdown_effects(
            ticket,
            policy.reminder_interval,
            policy.staff_alert_offset,
        ))
        .await
    }

    async fn handle_reminder(&self, ticket: &TicketId) -> Result<(), RuntimeError> {
        let Some(mut record) = self.load(ticket).await? else {
            return Ok(());
        };
        if record.is_escalated() {
            return Ok(());
        }
        let Some(elapsed_ms) = record.elapsed_ms(self.clock().epoch_ms()) else {
            return Ok(());
        };
        let elapsed = Duration::from_millis(elapsed_ms);

        // A reminder landing on or after the alert offset yields to the alert
        if self.config.policy.alert_due(elapsed) {
            tracing::debug!(ticket_id = %ticket, elapsed_ms, "reminder superseded by staff alert");
            return Ok(());
        }

        let Some(count) = record.record_reminder() else {
            return Ok(());
        };
        self.persist(&record).await?;

        tracing::info!(ticket_id = %ticket, count, elapsed_ms, "sending reminder");
        self.execute_all(vec![self.reminder_effect(&record, elapsed, count)])
            .await
    }

    async fn handle_staff_alert(&self, ticket: &TicketId) -> Result<(), RuntimeError> {
        let Some(mut record) = self.load(ticket).await? else {
            return Ok(());
        };
        let now_ms = self.clock().epoch_ms();
        if !record.record_alert(now_ms) {
            return Ok(());
        }
        self.persist(&record).await?;

        let elapsed = Duration::from_millis(record.elapsed_ms(now_ms).unwrap_or_default());
        tracing::info!(ticket_id = %ticket, reminders = record.reminder_count, "escalating to staff");
        self.execute_all(self.alert_effects(&record, elapsed)).await
    }

    pub(crate) fn reminder_effect(
        &self,
        record: &TicketRecord,
        elapsed: Duration,
        count: u32,
    ) -> Effect {
        let final_warning = self.config.policy.is_final_reminder(count);
        Effect::SendReminder {
            ticket_id: record.id.clone(),
            content: notice::reminder(&record.creator_id, elapsed, final_warning),
        }
    }

    /// Stop the reminder loop and notify the alert roles
    pub(crate) fn alert_effects(&self, record: &TicketRecord, elapsed: Duration) -> Vec<Effect> {
        vec![
            Effect::CancelTimer {
                id: TimerId::reminder(&record.id),
            },
            Effect::SendAlert {
                ticket_id: record.id.clone(),
                roles: self.config.alert_roles.clone(),
                content: notice::staff_alert(&record.creator_id, &self.config.alert_roles, elapsed),
            },
        ]
    }
}
