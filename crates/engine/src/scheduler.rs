// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer and scheduling management.
//!
//! The scheduler is passive: the daemon polls [`Scheduler::fired_timers`]
//! and feeds the resulting events back through the runtime. Every arm gets
//! a fresh generation number, and a handler must [`Scheduler::claim`] its
//! firing before acting on it, so a timer cancelled or re-armed between
//! firing and handling never touches the record.

use nudge_core::{Event, Schedule, TicketId, TimerId, TimerKind};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Timer {
    fires_at: Instant,
    period: Option<Duration>,
    generation: u64,
    /// One-shot that fired and awaits its claim
    in_flight: bool,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    timers: HashMap<TimerId, Timer>,
    next_generation: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer, replacing any live timer with the same id.
    ///
    /// Returns the generation the firing events will carry.
    pub fn arm(&mut self, id: TimerId, schedule: Schedule, now: Instant) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.timers.insert(
            id,
            Timer {
                fires_at: now + schedule.first_delay(),
                period: schedule.period().filter(|p| !p.is_zero()),
                generation,
                in_flight: false,
            },
        );
        generation
    }

    /// Cancel a timer. Returns false if it was not live.
    pub fn cancel(&mut self, id: &TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    /// Cancel every timer for a ticket. Returns how many were live.
    pub fn cancel_all(&mut self, ticket: &TicketId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|id, _| &id.ticket != ticket);
        before - self.timers.len()
    }

    pub fn is_live(&self, id: &TimerId) -> bool {
        self.timers.contains_key(id)
    }

    pub fn has_live(&self, ticket: &TicketId) -> bool {
        self.timers.keys().any(|id| &id.ticket == ticket)
    }

    /// Kinds of the live timers for a ticket, in declaration order
    pub fn live_kinds(&self, ticket: &TicketId) -> Vec<TimerKind> {
        TimerKind::ALL
            .into_iter()
            .filter(|kind| self.is_live(&TimerId::new(ticket.clone(), *kind)))
            .collect()
    }

    /// Collect timers due at `now`, earliest first.
    ///
    /// Repeating timers advance past `now` by whole periods, so a loop that
    /// was starved for several periods fires once, not once per missed tick.
    pub fn fired_timers(&mut self, now: Instant) -> Vec<Event> {
        let mut due: Vec<(Instant, TimerId, u64)> = Vec::new();

        for (id, timer) in self.timers.iter_mut() {
            if timer.in_flight || timer.fires_at > now {
                continue;
            }
            due.push((timer.fires_at, id.clone(), timer.generation));

            match timer.period {
                Some(period) => {
                    while timer.fires_at <= now {
                        timer.fires_at += period;
                    }
                }
                None => timer.in_flight = true,
            }
        }

        due.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.to_string().cmp(&b.1.to_string())));
        due.into_iter()
            .map(|(_, id, generation)| Event::TimerFired { id, generation })
            .collect()
    }

    /// Accept a firing for handling.
    ///
    /// False when the timer was cancelled or re-armed since it fired. A
    /// claimed one-shot is removed; a repeating timer stays armed.
    pub fn claim(&mut self, id: &TimerId, generation: u64) -> bool {
        let Some(timer) = self.timers.get(id) else {
            return false;
        };
        if timer.generation != generation {
            return false;
        }
        if timer.period.is_none() {
            if !timer.in_flight {
                return false;
            }
            self.timers.remove(id);
        }
        true
    }

    /// Earliest deadline among armed (not in-flight) timers
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers
            .values()
            .filter(|t| !t.in_flight)
            .map(|t| t.fires_at)
            .min()
    }

    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
