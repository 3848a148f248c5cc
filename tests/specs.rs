//! Behavioral specifications for the nudge engine.
//!
//! These tests drive whole ticket lifecycles through the public runtime API
//! with a simulated clock, including daemon restarts over a shared store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// escalation/
#[path = "specs/escalation/commands.rs"]
mod escalation_commands;
#[path = "specs/escalation/schedule.rs"]
mod escalation_schedule;

// downtime/
#[path = "specs/downtime/restart.rs"]
mod downtime_restart;
#[path = "specs/downtime/wal_recovery.rs"]
mod downtime_wal_recovery;
