// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staff command handling

use super::super::Runtime;
use crate::command::{CommandReply, TicketCommand};
use crate::error::RuntimeError;
use nudge_adapters::Messenger;
use nudge_core::{Clock, Effect, Participant, TicketId, TicketRecord, UserId};
use nudge_storage::TicketStore;

impl<M, S, C> Runtime<M, S, C>
where
    M: Messenger,
    S: TicketStore,
    C: Clock,
{
    /// Run a staff command against a ticket.
    ///
    /// Non-staff invokers get [`CommandReply::Denied`] without touching state.
    pub async fn handle_command(
        &self,
        ticket: &TicketId,
        invoker: &Participant,
        command: TicketCommand,
    ) -> Result<CommandReply, RuntimeError> {
        if !invoker.is_staff() {
            tracing::info!(
                ticket_id = %ticket,
                invoker = %invoker.id,
                command = command.name(),
                "command denied"
            );
            return Ok(CommandReply::Denied);
        }

        let guard = self.locks.lock(ticket).await;
        let result = self.run_command(ticket, command).await;
        drop(guard);
        self.release_lock(ticket);

        let reply = result?;
        tracing::info!(ticket_id = %ticket, invoker = %invoker.id, ?reply, "command handled");
        Ok(reply)
    }

    /// Caller must hold the ticket lock.
    async fn run_command(
        &self,
        ticket: &TicketId,
        command: TicketCommand,
    ) -> Result<CommandReply, RuntimeError> {
        let record = self.load(ticket).await?;
        let reply = match command {
            TicketCommand::TimerStop => self.stop_timer(ticket, record).await?,
            TicketCommand::TimerRestart => match record {
                Some(record) => self.restart_timer(record).await?,
                None => CommandReply::NotTracked,
            },
            TicketCommand::TimerStatus => {
                CommandReply::Status(self.status_of(ticket, record.as_ref()))
            }
            TicketCommand::CreatorCheck => match record {
                Some(record) => CommandReply::Creator {
                    creator_id: record.creator_id,
                },
                None => CommandReply::NotTracked,
            },
            TicketCommand::CreatorAssign { user } => {
                self.assign_creator(ticket, record, user).await?
            }
        };
        Ok(reply)
    }

    async fn stop_timer(
        &self,
        ticket: &TicketId,
        record: Option<TicketRecord>,
    ) -> Result<CommandReply, RuntimeError> {
        let Some(mut record) = record else {
            return Ok(CommandReply::NotTracked);
        };

        let had_timers = self.has_live_timers(ticket);
        let was_running = record.clear_timer();
        if was_running {
            self.persist(&record).await?;
        }
        self.execute_all(vec![Effect::CancelTicketTimers {
            ticket_id: ticket.clone(),
        }])
        .await?;

        Ok(if was_running || had_timers {
            CommandReply::Stopped
        } else {
            CommandReply::NotRunning
        })
    }

    /// Fresh countdown from now, no pre-delay and no immediate reminder
    async fn restart_timer(&self, mut record: TicketRecord) -> Result<CommandReply, RuntimeError> {
        let started_at_ms = self.clock().epoch_ms();
        record.start_timer(started_at_ms);
        self.persist(&record).await?;

        let policy = &self.config.policy;
        let mut effects = vec![Effect::CancelTicketTimers {
            ticket_id: record.id.clone(),
        }];
        effects.extend(self.countdown_effects(
            &record.id,
            policy.reminder_interval,
            policy.staff_alert_offset,
        ));
        self.execute_all(effects).await?;

        Ok(CommandReply::Restarted { started_at_ms })
    }

    /// Set the creator without touching timer state
    async fn assign_creator(
        &self,
        ticket: &TicketId,
        record: Option<TicketRecord>,
        user: UserId,
    ) -> Result<CommandReply, RuntimeError> {
        let (record, previous) = match record {
            Some(mut record) => {
                let previous = std::mem::replace(&mut record.creator_id, user);
                (record, Some(previous))
            }
            None => (TicketRecord::new(ticket.clone(), user), None),
        };
        self.persist(&record).await?;

        Ok(CommandReply::CreatorAssigned {
            creator_id: record.creator_id,
            previous,
        })
    }
}
