// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Escalation timing rules.
//!
//! Once a countdown is active, reminder `n` is due at `n * reminder_interval`
//! and the staff alert at `staff_alert_offset`, both measured from the
//! countdown start. A reminder that would land on or after the alert never
//! fires: the alert closes the window. Everything here is pure arithmetic on
//! elapsed time so that the live engine and startup recovery compute the
//! same schedule.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default wait after a staff message before the countdown is active
pub const DEFAULT_PRE_DELAY: Duration = Duration::from_secs(10 * 60);

/// Default period between reminders
pub const DEFAULT_REMINDER_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Default time from countdown start to the staff alert
pub const DEFAULT_STAFF_ALERT_OFFSET: Duration = Duration::from_secs(24 * 60 * 60);

/// Reminder number rendered as the final warning
pub const DEFAULT_FINAL_REMINDER: u32 = 3;

/// A reminder due within this window at recovery fires immediately
pub const DEFAULT_CATCH_UP_TOLERANCE: Duration = Duration::from_secs(1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Timing configuration for the escalation window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub pre_delay: Duration,
    pub reminder_interval: Duration,
    pub staff_alert_offset: Duration,
    pub final_reminder: u32,
    pub catch_up_tolerance: Duration,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            pre_delay: DEFAULT_PRE_DELAY,
            reminder_interval: DEFAULT_REMINDER_INTERVAL,
            staff_alert_offset: DEFAULT_STAFF_ALERT_OFFSET,
            final_reminder: DEFAULT_FINAL_REMINDER,
            catch_up_tolerance: DEFAULT_CATCH_UP_TOLERANCE,
        }
    }
}

/// How to rebuild a ticket's timers after a restart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePlan {
    /// The alert window expired while the process was down
    AlertNow,
    /// Re-arm the reminder loop and the alert
    Resume {
        /// Reminder slots that have already passed
        due_reminders: u32,
        /// The next slot is within tolerance: send it now
        fire_now: bool,
        /// Delay until the loop's first firing
        first_reminder_in: Duration,
        /// Delay until the staff alert
        alert_in: Duration,
    },
}

impl EscalationPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.reminder_interval.is_zero() {
            return Err(PolicyError::ZeroDuration("reminder interval"));
        }
        if self.staff_alert_offset.is_zero() {
            return Err(PolicyError::ZeroDuration("staff alert offset"));
        }
        Ok(())
    }

    pub fn alert_due(&self, elapsed: Duration) -> bool {
        elapsed >= self.staff_alert_offset
    }

    pub fn is_final_reminder(&self, count: u32) -> bool {
        count == self.final_reminder
    }

    /// Largest reminder number that lands strictly before the alert
    pub fn max_reminders(&self) -> u32 {
        let interval = self.reminder_interval.as_millis().max(1);
        let offset = self.staff_alert_offset.as_millis();
        let slots = offset.div_ceil(interval).saturating_sub(1);
        u32::try_from(slots).unwrap_or(u32::MAX)
    }

    /// Number of reminder slots that have passed after `elapsed`
    pub fn reminders_due(&self, elapsed: Duration) -> u32 {
        let interval = self.reminder_interval.as_millis().max(1);
        let passed = u32::try_from(elapsed.as_millis() / interval).unwrap_or(u32::MAX);
        passed.min(self.max_reminders())
    }

    /// Time until the next reminder, or `None` once no further reminder can land
    pub fn next_reminder_in(&self, elapsed: Duration) -> Option<Duration> {
        let next = self.reminders_due(elapsed).checked_add(1)?;
        if next > self.max_reminders() {
            return None;
        }
        let at = self.reminder_interval.checked_mul(next)?;
        Some(at.saturating_sub(elapsed))
    }

    /// Time until the staff alert (zero once due)
    pub fn alert_in(&self, elapsed: Duration) -> Duration {
        self.staff_alert_offset.saturating_sub(elapsed)
    }

    /// Plan the schedule for a countdown that has been running for `elapsed`.
    ///
    /// With `elapsed = k * interval + r`, the loop's next firing is
    /// `interval - r` away, which is exactly when an uninterrupted process
    /// would have fired reminder `k + 1`.
    pub fn resume_plan(&self, elapsed: Duration) -> ResumePlan {
        if self.alert_due(elapsed) {
            return ResumePlan::AlertNow;
        }

        let interval_ms = self.reminder_interval.as_millis().max(1);
        let since_last = Duration::from_millis((elapsed.as_millis() % interval_ms) as u64);
        let to_next = self.reminder_interval.saturating_sub(since_last);
        let due_reminders = self.reminders_due(elapsed);
        let next_lands_before_alert = due_reminders < self.max_reminders();

        let (fire_now, first_reminder_in) =
            if to_next < self.catch_up_tolerance && next_lands_before_alert {
                (true, to_next + self.reminder_interval)
            } else {
                (false, to_next)
            };

        ResumePlan::Resume {
            due_reminders,
            fire_now,
            first_reminder_in,
            alert_in: self.alert_in(elapsed),
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
