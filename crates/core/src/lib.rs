// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! nudge-core: data model and timing rules for ticket inactivity escalation

pub mod clock;
pub mod effect;
pub mod event;
pub mod id;
pub mod notice;
pub mod participant;
pub mod policy;
pub mod ticket;
pub mod time_fmt;
pub mod timer;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use effect::Effect;
pub use event::Event;
pub use id::{ShortId, TicketId, UserId};
pub use participant::{Participant, Role};
pub use policy::{EscalationPolicy, ResumePlan};
pub use ticket::{TicketRecord, TicketState};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
pub use timer::{Schedule, TimerId, TimerKind};
