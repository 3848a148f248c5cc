// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime tests

mod commands;
mod concurrency;
mod countdown;
mod errors;
mod recovery;

use super::*;
use crate::{CommandReply, TicketCommand};
use nudge_adapters::FakeMessenger;
use nudge_core::test_support::{
    intake_message, message_event, requester_message, staff_message, ticket_deleted,
};
use nudge_core::{FakeClock, Participant, Role};
use nudge_storage::MemoryStore;

type TestRuntime = Runtime<FakeMessenger, MemoryStore, FakeClock>;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);

const TICKET: &str = "t-1";
const CREATOR: &str = "u-1";
const STAFF: &str = "s-1";
const INTAKE_BOT: &str = "intake-bot";

/// Test context holding the runtime and its fakes
struct TestContext {
    runtime: TestRuntime,
    clock: FakeClock,
    messenger: FakeMessenger,
    store: MemoryStore,
}

fn test_config() -> RuntimeConfig {
    RuntimeConfig::new(INTAKE_BOT, vec!["ops".to_string()])
}

fn build(
    clock: FakeClock,
    messenger: FakeMessenger,
    store: MemoryStore,
    config: RuntimeConfig,
) -> TestContext {
    let runtime = Runtime::new(
        RuntimeDeps {
            messenger: messenger.clone(),
            store: store.clone(),
        },
        clock.clone(),
        config,
    )
    .unwrap();
    TestContext {
        runtime,
        clock,
        messenger,
        store,
    }
}

fn setup() -> TestContext {
    setup_with_store(MemoryStore::new())
}

fn setup_with_store(store: MemoryStore) -> TestContext {
    build(FakeClock::new(), FakeMessenger::new(), store, test_config())
}

fn tid(id: &str) -> TicketId {
    TicketId::new(id)
}

impl TestContext {
    /// A fresh process over the same store, messenger and clock
    fn restart(&self) -> TestContext {
        build(
            self.clock.clone(),
            self.messenger.clone(),
            self.store.clone(),
            test_config(),
        )
    }

    async fn send(&self, event: Event) {
        self.runtime.handle_event(event).await.unwrap();
    }

    /// Advance simulated time, firing every timer at its own deadline
    async fn advance(&self, by: Duration) {
        let errors = self.try_advance(by).await;
        assert!(errors.is_empty(), "timer handling failed: {errors:?}");
    }

    async fn try_advance(&self, by: Duration) -> Vec<RuntimeError> {
        let target = self.clock.now() + by;
        let mut errors = Vec::new();
        while let Some(deadline) = self.runtime.next_deadline().filter(|d| *d <= target) {
            let now = self.clock.now();
            if deadline > now {
                self.clock.advance(deadline - now);
            }
            for event in self.runtime.fired_timers() {
                if let Err(e) = self.runtime.handle_event(event).await {
                    errors.push(e);
                }
            }
        }
        let now = self.clock.now();
        if target > now {
            self.clock.advance(target - now);
        }
        errors
    }

    /// Poll in real time, for store writes that land after a timeout
    async fn wait_until(&self, done: impl Fn(&TestContext) -> bool) {
        for _ in 0..400 {
            if done(self) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within 2s");
    }

    async fn state(&self, ticket: &str) -> TicketState {
        self.runtime.ticket_state(&tid(ticket)).await.unwrap()
    }

    fn record(&self, ticket: &str) -> TicketRecord {
        self.store.record(ticket).unwrap()
    }

    async fn command(&self, ticket: &str, command: TicketCommand) -> CommandReply {
        self.runtime
            .handle_command(&tid(ticket), &Participant::new(STAFF, Role::Staff), command)
            .await
            .unwrap()
    }

    /// Track `ticket` for CREATOR, then let a staff message start the countdown.
    ///
    /// Returns with the clock at the countdown start.
    async fn start_countdown(&self, ticket: &str) {
        self.send(requester_message(ticket, CREATOR)).await;
        self.send(staff_message(ticket, STAFF)).await;
        self.advance(10 * MINUTE).await;
        assert_eq!(self.state(ticket).await, TicketState::Active);
    }
}

// =============================================================================
// Tracking
// =============================================================================

#[tokio::test]
async fn requester_message_tracks_untracked_ticket() {
    let ctx = setup();

    ctx.send(requester_message(TICKET, CREATOR)).await;

    let record = ctx.record(TICKET);
    assert_eq!(record.creator_id, UserId::new(CREATOR));
    assert!(!record.is_running());
    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
}

#[tokio::test]
async fn intake_bot_attributes_first_non_staff_mention() {
    let ctx = setup();

    ctx.send(intake_message(
        TICKET,
        INTAKE_BOT,
        &[("s-9", Role::Staff), ("other-bot", Role::Bot), ("u-7", Role::Requester)],
    ))
    .await;

    assert_eq!(ctx.record(TICKET).creator_id, UserId::new("u-7"));
}

#[tokio::test]
async fn intake_bot_without_requester_mention_leaves_ticket_untracked() {
    let ctx = setup();

    ctx.send(intake_message(TICKET, INTAKE_BOT, &[("s-9", Role::Staff)]))
        .await;

    assert_eq!(ctx.state(TICKET).await, TicketState::Untracked);
}

#[tokio::test]
async fn staff_and_foreign_bots_do_not_open_tickets() {
    let ctx = setup();

    ctx.send(staff_message(TICKET, STAFF)).await;
    ctx.send(message_event(TICKET, "other-bot", Role::Bot)).await;
    ctx.send(message_event(TICKET, "boss", Role::Privileged)).await;

    assert_eq!(ctx.state(TICKET).await, TicketState::Untracked);
    assert!(ctx.store.ops().is_empty());
    assert!(!ctx.runtime.has_live_timers(&tid(TICKET)));
}

#[tokio::test]
async fn ticket_deleted_forgets_record_and_timers() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;

    ctx.send(ticket_deleted(TICKET)).await;

    assert_eq!(ctx.state(TICKET).await, TicketState::Untracked);
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());
    assert_eq!(ctx.runtime.ticket_count().await.unwrap(), 0);
}

#[tokio::test]
async fn lock_entry_pruned_once_ticket_has_no_timers() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    assert_eq!(ctx.runtime.locks.len(), 1);

    ctx.send(requester_message(TICKET, CREATOR)).await;

    assert!(ctx.runtime.locks.is_empty());
}

#[tokio::test]
async fn commands_leave_no_lock_entries_behind() {
    let ctx = setup();
    for n in 0..100 {
        let ticket = format!("t-{n}");
        ctx.command(&ticket, TicketCommand::TimerStatus).await;
        ctx.command(&ticket, TicketCommand::CreatorCheck).await;
    }
    assert!(ctx.runtime.locks.is_empty());

    ctx.start_countdown(TICKET).await;
    assert_eq!(ctx.command(TICKET, TicketCommand::TimerStop).await, CommandReply::Stopped);
    assert!(ctx.runtime.locks.is_empty());
}

#[tokio::test]
async fn restarted_countdown_keeps_its_lock_entry() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;

    ctx.command(TICKET, TicketCommand::TimerRestart).await;

    assert_eq!(ctx.runtime.locks.len(), 1);
}

#[tokio::test]
async fn unknown_events_are_ignored() {
    let ctx = setup();
    ctx.send(Event::Custom).await;
    assert_eq!(ctx.runtime.ticket_count().await.unwrap(), 0);
}

#[test]
fn zero_reminder_interval_is_rejected() {
    let mut config = test_config();
    config.policy.reminder_interval = Duration::ZERO;

    let result = Runtime::new(
        RuntimeDeps {
            messenger: FakeMessenger::new(),
            store: MemoryStore::new(),
        },
        FakeClock::new(),
        config,
    );

    assert!(matches!(result, Err(RuntimeError::Policy(_))));
}
