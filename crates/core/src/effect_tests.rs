// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use yare::parameterized;

fn ticket() -> TicketId {
    TicketId::new("t-1")
}

#[parameterized(
    set_timer = { Effect::SetTimer { id: TimerId::reminder(&ticket()), schedule: Schedule::every(Duration::from_secs(60)) }, "set_timer" },
    cancel_timer = { Effect::CancelTimer { id: TimerId::staff_alert(&ticket()) }, "cancel_timer" },
    cancel_all = { Effect::CancelTicketTimers { ticket_id: ticket() }, "cancel_ticket_timers" },
    reminder = { Effect::SendReminder { ticket_id: ticket(), content: "hi".into() }, "send_reminder" },
    alert = { Effect::SendAlert { ticket_id: ticket(), roles: vec![], content: "hi".into() }, "send_alert" },
)]
fn effect_names(effect: Effect, expected: &str) {
    assert_eq!(effect.name(), expected);
}

#[test]
fn set_timer_fields_include_period_when_repeating() {
    let effect = Effect::SetTimer {
        id: TimerId::reminder(&ticket()),
        schedule: Schedule::Every {
            first: Duration::from_millis(500),
            period: Duration::from_secs(2),
        },
    };
    assert_eq!(
        effect.fields(),
        vec![
            ("timer_id", "reminder:t-1".to_string()),
            ("first_ms", "500".to_string()),
            ("period_ms", "2000".to_string()),
        ]
    );
}

#[test]
fn one_shot_fields_omit_period() {
    let effect = Effect::SetTimer {
        id: TimerId::pending_start(&ticket()),
        schedule: Schedule::once(Duration::from_secs(600)),
    };
    let fields = effect.fields();
    assert_eq!(fields.len(), 2);
    assert!(fields.iter().all(|(k, _)| *k != "period_ms"));
}

#[test]
fn alert_fields_join_roles() {
    let effect = Effect::SendAlert {
        ticket_id: ticket(),
        roles: vec!["111".into(), "222".into()],
        content: "x".into(),
    };
    assert!(effect.fields().contains(&("roles", "111,222".to_string())));
}
