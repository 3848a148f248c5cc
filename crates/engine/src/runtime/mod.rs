// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ticket lifecycle runtime

mod handlers;
mod recovery;
mod settle;

pub use recovery::RecoverySummary;

use crate::command::TicketStatus;
use crate::error::RuntimeError;
use crate::executor::{ExecuteError, Executor};
use crate::locks::TicketLocks;
use crate::scheduler::Scheduler;
use nudge_adapters::{Messenger, MessengerError};
use nudge_core::{
    Clock, Effect, EscalationPolicy, Event, TicketId, TicketRecord, TicketState, TimerId,
    TimerKind, UserId,
};
use nudge_storage::{StoreError, TicketStore};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Default bound on a single store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Behavioral configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub policy: EscalationPolicy,
    /// Role refs pinged by staff alerts
    pub alert_roles: Vec<String>,
    /// The intake bot whose opening message names the requester
    pub intake_bot: UserId,
    pub store_timeout: Duration,
}

impl RuntimeConfig {
    pub fn new(intake_bot: impl Into<UserId>, alert_roles: Vec<String>) -> Self {
        Self {
            policy: EscalationPolicy::default(),
            alert_roles,
            intake_bot: intake_bot.into(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Runtime adapter dependencies
pub struct RuntimeDeps<M, S> {
    pub messenger: M,
    pub store: S,
}

/// Drives every ticket through its lifecycle.
///
/// All mutations of one ticket run under that ticket's lock, from the first
/// store read to the last timer re-arm.
pub struct Runtime<M, S, C: Clock> {
    pub(crate) executor: Executor<M, C>,
    pub(crate) store: S,
    pub(crate) locks: TicketLocks,
    pub(crate) config: RuntimeConfig,
}

impl<M, S, C> Runtime<M, S, C>
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    pub fn new(
        deps: RuntimeDeps<M, S>,
        clock: C,
        config: RuntimeConfig,
    ) -> Result<Self, RuntimeError> {
        config.policy.validate()?;
        Ok(Self {
            executor: Executor::new(
                deps.messenger,
                Arc::new(Mutex::new(Scheduler::new())),
                clock,
            ),
            store: deps.store,
            locks: TicketLocks::new(),
            config,
        })
    }

    pub fn clock(&self) -> &C {
        self.executor.clock()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.config.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a shared reference to the scheduler (for timer checking in the daemon loop)
    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        self.executor.scheduler()
    }

    /// Timer events due now
    pub fn fired_timers(&self) -> Vec<Event> {
        let now = self.clock().now();
        self.executor.scheduler().lock().fired_timers(now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.executor.scheduler().lock().next_deadline()
    }

    pub fn live_timers(&self, ticket: &TicketId) -> Vec<TimerKind> {
        self.executor.scheduler().lock().live_kinds(ticket)
    }

    pub fn has_live_timers(&self, ticket: &TicketId) -> bool {
        self.executor.scheduler().lock().has_live(ticket)
    }

    /// Number of tracked tickets
    pub async fn ticket_count(&self) -> Result<usize, RuntimeError> {
        self.bounded("count", self.store.count()).await
    }

    pub async fn ticket_state(&self, ticket: &TicketId) -> Result<TicketState, RuntimeError> {
        Ok(self.status(ticket).await?.state)
    }

    /// Current status of a ticket, for display
    pub async fn status(&self, ticket: &TicketId) -> Result<TicketStatus, RuntimeError> {
        let record = self.load(ticket).await?;
        Ok(self.status_of(ticket, record.as_ref()))
    }

    pub(crate) fn status_of(&self, ticket: &TicketId, record: Option<&TicketRecord>) -> TicketStatus {
        let pending = self
            .executor
            .scheduler()
            .lock()
            .is_live(&TimerId::pending_start(ticket));
        let now_ms = self.clock().epoch_ms();
        TicketStatus {
            ticket_id: ticket.clone(),
            state: TicketState::derive(record, pending),
            creator_id: record.map(|r| r.creator_id.clone()),
            elapsed_ms: record.and_then(|r| r.elapsed_ms(now_ms)),
            reminder_count: record.map_or(0, |r| r.reminder_count),
            alerted_at_ms: record.and_then(|r| r.alerted_at_ms),
        }
    }

    // === Store access, bounded by the configured timeout ===

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, RuntimeError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let timeout = self.config.store_timeout;
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(RuntimeError::StoreTimeout { op, timeout }),
        }
    }

    /// Wait a bounded time for a spawned write.
    ///
    /// A write that times out may still land, so the ticket's timers are
    /// rebuilt from the durable record once it resolves.
    async fn bounded_write<T: Send + 'static>(
        &self,
        op: &'static str,
        ticket: &TicketId,
        mut write: JoinHandle<Result<T, StoreError>>,
    ) -> Result<T, RuntimeError> {
        let timeout = self.config.store_timeout;
        match tokio::time::timeout(timeout, &mut write).await {
            Ok(joined) => Ok(joined.map_err(|e| StoreError::Task(e.to_string()))??),
            Err(_) => {
                tracing::warn!(ticket_id = %ticket, op, "store write outcome unknown, settling timers once it resolves");
                tokio::spawn(self.settle(ticket).run(write));
                Err(RuntimeError::StoreTimeout { op, timeout })
            }
        }
    }

    fn settle(&self, ticket: &TicketId) -> settle::Settle<S, C> {
        settle::Settle {
            ticket: ticket.clone(),
            store: self.store.clone(),
            scheduler: self.executor.scheduler(),
            locks: self.locks.clone(),
            clock: self.clock().clone(),
            policy: self.config.policy.clone(),
            store_timeout: self.config.store_timeout,
        }
    }

    pub(crate) async fn load(&self, ticket: &TicketId) -> Result<Option<TicketRecord>, RuntimeError> {
        self.bounded("get", self.store.get(ticket)).await
    }

    pub(crate) async fn persist(&self, record: &TicketRecord) -> Result<(), RuntimeError> {
        debug_assert!(record.invariants_hold(), "record invariant violated: {record:?}");
        let store = self.store.clone();
        let owned = record.clone();
        let write = tokio::spawn(async move { store.upsert(&owned).await });
        self.bounded_write("upsert", &record.id, write).await
    }

    pub(crate) async fn remove(&self, ticket: &TicketId) -> Result<bool, RuntimeError> {
        let store = self.store.clone();
        let owned = ticket.clone();
        let write = tokio::spawn(async move { store.delete(&owned).await });
        self.bounded_write("delete", ticket, write).await
    }

    /// Drop the ticket's lock entry once nothing keeps it busy
    pub(crate) fn release_lock(&self, ticket: &TicketId) {
        if !self.has_live_timers(ticket) {
            self.locks.prune(ticket);
        }
    }

    // === Effects ===

    /// Run effects in order. Delivery failures are logged and skipped; a
    /// ticket whose channel turned out to be gone is forgotten.
    ///
    /// Caller must hold the ticket lock.
    pub(crate) async fn execute_all(&self, effects: Vec<Effect>) -> Result<(), RuntimeError> {
        let mut gone: Option<TicketId> = None;
        for effect in effects {
            match self.executor.execute(effect).await {
                Ok(()) => {}
                Err(ExecuteError::Messenger(MessengerError::TicketGone(ticket))) => {
                    gone = Some(ticket);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "delivery failed, schedule unaffected");
                }
            }
        }
        if let Some(ticket) = gone {
            tracing::info!(ticket_id = %ticket, "ticket channel gone, forgetting ticket");
            self.forget(&ticket).await?;
        }
        Ok(())
    }

    /// Cancel every timer and drop the record. Caller must hold the ticket lock.
    pub(crate) async fn forget(&self, ticket: &TicketId) -> Result<bool, RuntimeError> {
        let existed = self.remove(ticket).await?;
        self.executor
            .execute(Effect::CancelTicketTimers {
                ticket_id: ticket.clone(),
            })
            .await?;
        Ok(existed)
    }

    /// Effects that arm the reminder loop and the staff alert
    pub(crate) fn countdown_effects(
        &self,
        ticket: &TicketId,
        first_reminder_in: Duration,
        alert_in: Duration,
    ) -> Vec<Effect> {
        vec![
            Effect::SetTimer {
                id: TimerId::reminder(ticket),
                schedule: nudge_core::Schedule::Every {
                    first: first_reminder_in,
                    period: self.config.policy.reminder_interval,
                },
            },
            Effect::SetTimer {
                id: TimerId::staff_alert(ticket),
                schedule: nudge_core::Schedule::once(alert_in),
            },
        ]
    }
}

#[cfg(test)]
#[path = "../runtime_tests/mod.rs"]
mod tests;
