// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::Scheduler;
use nudge_adapters::{Messenger, MessengerError};
use nudge_core::{Clock, Effect};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("messenger error: {0}")]
    Messenger(#[from] MessengerError),
}

/// Executes effects against the scheduler and the messenger
pub struct Executor<M, C: Clock> {
    messenger: M,
    scheduler: Arc<Mutex<Scheduler>>,
    clock: C,
}

impl<M, C> Executor<M, C>
where
    M: Messenger,
    C: Clock,
{
    pub fn new(messenger: M, scheduler: Arc<Mutex<Scheduler>>, clock: C) -> Self {
        Self {
            messenger,
            scheduler,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Shared scheduler (polled by the daemon's timer loop)
    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        Arc::clone(&self.scheduler)
    }

    /// Execute a single effect with tracing
    pub async fn execute(&self, effect: Effect) -> Result<(), ExecuteError> {
        let span = tracing::info_span!("effect", effect = effect.name());
        async move {
            tracing::debug!(fields = ?effect.fields(), "executing");

            let start = std::time::Instant::now();
            let result = self.execute_inner(effect).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "completed"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute_inner(&self, effect: Effect) -> Result<(), ExecuteError> {
        match effect {
            // === Timer effects ===
            Effect::SetTimer { id, schedule } => {
                let now = self.clock.now();
                self.scheduler.lock().arm(id, schedule, now);
                Ok(())
            }
            Effect::CancelTimer { id } => {
                self.scheduler.lock().cancel(&id);
                Ok(())
            }
            Effect::CancelTicketTimers { ticket_id } => {
                self.scheduler.lock().cancel_all(&ticket_id);
                Ok(())
            }

            // === Chat effects ===
            Effect::SendReminder { ticket_id, content } => {
                self.messenger.send_message(&ticket_id, &content).await?;
                Ok(())
            }
            Effect::SendAlert {
                ticket_id,
                roles,
                content,
            } => {
                self.messenger
                    .send_alert(&ticket_id, &roles, &content)
                    .await?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
