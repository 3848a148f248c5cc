// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rebuilding timers from persisted records after a restart.
//!
//! The timer registry starts empty, so every running countdown is
//! re-derived from `timer_start_ms`. The resumed schedule lands on the same
//! instants an uninterrupted process would have used. Reminder slots missed
//! while down are counted but not re-sent.

use super::Runtime;
use crate::error::RuntimeError;
use nudge_adapters::Messenger;
use nudge_core::{Clock, ResumePlan, TicketRecord};
use nudge_storage::TicketStore;
use serde::Serialize;
use std::time::Duration;

/// What startup recovery did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecoverySummary {
    /// Countdowns re-armed
    pub resumed: usize,
    /// Already escalated, or escalated during recovery
    pub escalated: usize,
    /// Records deleted because the channel is gone
    pub orphaned: usize,
    /// Records with no countdown
    pub idle: usize,
    /// Records that could not be recovered (store errors)
    pub failed: usize,
}

enum Outcome {
    Resumed,
    Escalated,
    Orphaned,
    Idle,
}

impl<M, S, C> Runtime<M, S, C>
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    /// Reconcile every persisted record against the clock.
    ///
    /// Runs before the daemon accepts events. One ticket failing does not
    /// stop the others.
    pub async fn recover(&self) -> Result<RecoverySummary, RuntimeError> {
        let records = self.bounded("list_all", self.store.list_all()).await?;
        let mut summary = RecoverySummary::default();

        for record in records {
            let ticket = record.id.clone();
            let guard = self.locks.lock(&ticket).await;
            let outcome = self.recover_ticket(record).await;
            drop(guard);
            self.release_lock(&ticket);

            match outcome {
                Ok(Outcome::Resumed) => summary.resumed += 1,
                Ok(Outcome::Escalated) => summary.escalated += 1,
                Ok(Outcome::Orphaned) => summary.orphaned += 1,
                Ok(Outcome::Idle) => summary.idle += 1,
                Err(e) => {
                    tracing::error!(ticket_id = %ticket, error = %e, "failed to recover ticket");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            resumed = summary.resumed,
            escalated = summary.escalated,
            orphaned = summary.orphaned,
            idle = summary.idle,
            failed = summary.failed,
            "recovery complete"
        );
        Ok(summary)
    }

    async fn recover_ticket(&self, mut record: TicketRecord) -> Result<Outcome, RuntimeError> {
        if !record.is_running() {
            return Ok(Outcome::Idle);
        }
        let ticket = record.id.clone();

        match self.executor.messenger().ticket_exists(&ticket).await {
            Ok(true) => {}
            Ok(false) => {
                self.forget(&ticket).await?;
                tracing::info!(ticket_id = %ticket, "channel gone, orphaned record deleted");
                return Ok(Outcome::Orphaned);
            }
            Err(e) => {
                tracing::warn!(ticket_id = %ticket, error = %e, "ticket lookup failed, recovering anyway");
            }
        }

        if record.is_escalated() {
            return Ok(Outcome::Escalated);
        }

        // The lookup may be slow, so elapsed time is measured after it
        let now_ms = self.clock().epoch_ms();
        let Some(elapsed_ms) = record.elapsed_ms(now_ms) else {
            return Ok(Outcome::Idle);
        };
        let elapsed = Duration::from_millis(elapsed_ms);
        match self.config.policy.resume_plan(elapsed) {
            ResumePlan::AlertNow => {
                record.record_alert(now_ms);
                self.persist(&record).await?;
                tracing::info!(ticket_id = %ticket, elapsed_ms, "alert window expired while down, escalating");
                self.execute_all(self.alert_effects(&record, elapsed)).await?;
                Ok(Outcome::Escalated)
            }
            ResumePlan::Resume {
                due_reminders,
                fire_now,
                first_reminder_in,
                alert_in,
            } => {
                let mut changed = record.reconcile_reminders(due_reminders);
                let catch_up = if fire_now {
                    changed = true;
                    record.record_reminder()
                } else {
                    None
                };
                if changed {
                    self.persist(&record).await?;
                }

                tracing::info!(
                    ticket_id = %ticket,
                    elapsed_ms,
                    reminders = record.reminder_count,
                    next_reminder_ms = first_reminder_in.as_millis() as u64,
                    alert_ms = alert_in.as_millis() as u64,
                    "countdown resumed"
                );

                let mut effects = self.countdown_effects(&ticket, first_reminder_in, alert_in);
                if let Some(count) = catch_up {
                    effects.push(self.reminder_effect(&record, elapsed, count));
                }
                self.execute_all(effects).await?;
                Ok(Outcome::Resumed)
            }
        }
    }
}
