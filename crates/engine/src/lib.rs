// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nudge escalation engine

mod command;
mod error;
mod executor;
mod locks;
mod runtime;
mod scheduler;

pub use command::{CommandReply, TicketCommand, TicketStatus};
pub use error::RuntimeError;
pub use executor::{ExecuteError, Executor};
pub use locks::TicketLocks;
pub use runtime::{RecoverySummary, Runtime, RuntimeConfig, RuntimeDeps, DEFAULT_STORE_TIMEOUT};
pub use scheduler::Scheduler;
