// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timers after a store write whose outcome was unknown.
//!
//! A write that outlives the store timeout keeps running in its own task.
//! Once it resolves, the ticket's countdown timers are rebuilt from
//! whatever record is durable, under the ticket lock.

use crate::locks::TicketLocks;
use crate::scheduler::Scheduler;
use nudge_core::{
    Clock, EscalationPolicy, ResumePlan, Schedule, TicketId, TicketRecord, TimerId,
};
use nudge_storage::{StoreError, TicketStore};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Everything needed to reconcile one ticket without the runtime
pub(super) struct Settle<S, C> {
    pub ticket: TicketId,
    pub store: S,
    pub scheduler: Arc<Mutex<Scheduler>>,
    pub locks: TicketLocks,
    pub clock: C,
    pub policy: EscalationPolicy,
    pub store_timeout: Duration,
}

impl<S, C> Settle<S, C>
where
    S: TicketStore,
    C: Clock,
{
    pub(super) async fn run<T>(self, write: JoinHandle<Result<T, StoreError>>) {
        let ticket = &self.ticket;
        match write.await {
            Ok(Ok(_)) => tracing::info!(ticket_id = %ticket, "late store write landed"),
            Ok(Err(e)) => tracing::warn!(ticket_id = %ticket, error = %e, "late store write failed"),
            Err(e) => tracing::warn!(ticket_id = %ticket, error = %e, "store write task failed"),
        }

        let guard = self.locks.lock(ticket).await;
        let record = match tokio::time::timeout(self.store_timeout, self.store.get(ticket)).await {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                tracing::error!(ticket_id = %ticket, error = %e, "cannot settle timers, read failed");
                return;
            }
            Err(_) => {
                tracing::error!(ticket_id = %ticket, "cannot settle timers, read timed out");
                return;
            }
        };

        let timers = countdown_timers(&self.policy, ticket, record.as_ref(), self.clock.epoch_ms());
        let armed = timers.len();
        let live = {
            let mut scheduler = self.scheduler.lock();
            // A pending start is memory-only and valid for any idle record
            if record.as_ref().is_some_and(|r| !r.is_running()) {
                scheduler.cancel(&TimerId::reminder(ticket));
                scheduler.cancel(&TimerId::staff_alert(ticket));
            } else {
                scheduler.cancel_all(ticket);
            }
            let now = self.clock.now();
            for (id, schedule) in timers {
                scheduler.arm(id, schedule, now);
            }
            scheduler.has_live(ticket)
        };
        drop(guard);

        if !live {
            self.locks.prune(ticket);
        }
        tracing::info!(ticket_id = %ticket, armed, "timers settled against durable record");
    }
}

/// Countdown timers a durable record calls for at `now_ms`.
///
/// Slots missed while the write hung are skipped, and an overdue alert
/// fires straight away through the normal alert path.
pub(super) fn countdown_timers(
    policy: &EscalationPolicy,
    ticket: &TicketId,
    record: Option<&TicketRecord>,
    now_ms: u64,
) -> Vec<(TimerId, Schedule)> {
    let Some(record) = record.filter(|r| !r.is_escalated()) else {
        return Vec::new();
    };
    let Some(elapsed_ms) = record.elapsed_ms(now_ms) else {
        return Vec::new();
    };

    match policy.resume_plan(Duration::from_millis(elapsed_ms)) {
        ResumePlan::AlertNow => vec![(TimerId::staff_alert(ticket), Schedule::once(Duration::ZERO))],
        ResumePlan::Resume {
            fire_now,
            first_reminder_in,
            alert_in,
            ..
        } => {
            let first = if fire_now {
                Duration::ZERO
            } else {
                first_reminder_in
            };
            vec![
                (
                    TimerId::reminder(ticket),
                    Schedule::Every {
                        first,
                        period: policy.reminder_interval,
                    },
                ),
                (TimerId::staff_alert(ticket), Schedule::once(alert_in)),
            ]
        }
    }
}

#[cfg(test)]
#[path = "settle_tests.rs"]
mod tests;
