//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL over the runtime: a [`Daemon`] owns one runtime
//! process, and [`Daemon::restart`] replaces it with a fresh one over the
//! same store, messenger and clock.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::time::Duration;

pub use nudge_adapters::FakeMessenger;
pub use nudge_core::test_support::{requester_message, staff_message};
pub use nudge_core::{Clock, FakeClock, Participant, Role, TicketId, TicketState};
pub use nudge_engine::{CommandReply, RecoverySummary, Runtime, TicketCommand};
pub use nudge_storage::{MemoryStore, TicketStore, WalStore};

use nudge_engine::{RuntimeConfig, RuntimeDeps};

pub const MINUTE: Duration = Duration::from_secs(60);
pub const HOUR: Duration = Duration::from_secs(60 * 60);

pub const TICKET: &str = "t-1";
pub const CREATOR: &str = "u-1";
pub const STAFF: &str = "s-1";

/// One daemon process over a store that outlives it
pub struct Daemon<S: TicketStore> {
    pub runtime: Runtime<FakeMessenger, S, FakeClock>,
    pub clock: FakeClock,
    pub messenger: FakeMessenger,
    pub store: S,
}

fn config() -> RuntimeConfig {
    RuntimeConfig::new("intake-bot", vec!["ops".to_string()])
}

impl Daemon<MemoryStore> {
    pub fn start() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl<S: TicketStore> Daemon<S> {
    pub fn with_store(store: S) -> Self {
        Self::boot(FakeClock::new(), FakeMessenger::new(), store)
    }

    fn boot(clock: FakeClock, messenger: FakeMessenger, store: S) -> Self {
        let runtime = Runtime::new(
            RuntimeDeps {
                messenger: messenger.clone(),
                store: store.clone(),
            },
            clock.clone(),
            config(),
        )
        .unwrap();
        Self {
            runtime,
            clock,
            messenger,
            store,
        }
    }

    /// Stop this process, let `downtime` pass, and recover a new one.
    pub async fn restart(self, downtime: Duration) -> (Self, RecoverySummary) {
        self.restart_with_store(downtime, |store| store).await
    }

    /// Like [`Daemon::restart`], with the store reopened by `reopen`.
    pub async fn restart_with_store(
        self,
        downtime: Duration,
        reopen: impl FnOnce(S) -> S,
    ) -> (Self, RecoverySummary) {
        let Self {
            runtime,
            clock,
            messenger,
            store,
        } = self;
        drop(runtime);
        clock.advance(downtime);
        let daemon = Self::boot(clock, messenger, reopen(store));
        let summary = daemon.runtime.recover().await.unwrap();
        (daemon, summary)
    }

    pub async fn send(&self, event: nudge_core::Event) {
        self.runtime.handle_event(event).await.unwrap();
    }

    /// Requester opens the ticket, staff answers, pre-delay elapses.
    pub async fn open_and_wait_on_requester(&self, ticket: &str) {
        self.send(requester_message(ticket, CREATOR)).await;
        self.send(staff_message(ticket, STAFF)).await;
        self.advance(10 * MINUTE).await;
        assert_eq!(self.state(ticket).await, TicketState::Active);
    }

    /// Advance simulated time, firing every timer at its own deadline
    pub async fn advance(&self, by: Duration) {
        let target = self.clock.now() + by;
        while let Some(deadline) = self.runtime.next_deadline().filter(|d| *d <= target) {
            let now = self.clock.now();
            if deadline > now {
                self.clock.advance(deadline - now);
            }
            for event in self.runtime.fired_timers() {
                self.runtime.handle_event(event).await.unwrap();
            }
        }
        let now = self.clock.now();
        if target > now {
            self.clock.advance(target - now);
        }
    }

    pub async fn state(&self, ticket: &str) -> TicketState {
        self.runtime
            .ticket_state(&TicketId::new(ticket))
            .await
            .unwrap()
    }

    pub async fn command(&self, ticket: &str, command: TicketCommand) -> CommandReply {
        self.runtime
            .handle_command(
                &TicketId::new(ticket),
                &Participant::new(STAFF, Role::Staff),
                command,
            )
            .await
            .unwrap()
    }

    pub fn reminders(&self, ticket: &str) -> Vec<String> {
        self.messenger.messages(ticket)
    }

    pub fn alerts(&self, ticket: &str) -> Vec<String> {
        self.messenger.alerts(ticket)
    }
}
