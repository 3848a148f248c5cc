// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn timer_id_display() {
    let ticket = TicketId::new("chan-9");
    assert_eq!(TimerId::pending_start(&ticket).to_string(), "pending-start:chan-9");
    assert_eq!(TimerId::reminder(&ticket).to_string(), "reminder:chan-9");
    assert_eq!(TimerId::staff_alert(&ticket).to_string(), "staff-alert:chan-9");
}

#[test]
fn timer_id_parse_round_trips_every_kind() {
    let ticket = TicketId::new("t");
    for kind in TimerKind::ALL {
        let id = TimerId::new(ticket.clone(), kind);
        assert_eq!(TimerId::parse(&id.to_string()), Some(id));
    }
}

#[test]
fn ticket_ids_may_contain_colons() {
    let id = TimerId::parse("reminder:guild:123").unwrap();
    assert_eq!(id.kind, TimerKind::Reminder);
    assert_eq!(id.ticket, "guild:123");
}

#[yare::parameterized(
    unknown_kind = { "cooldown:t-1" },
    no_separator = { "reminder" },
    empty_ticket = { "reminder:" },
)]
fn malformed_timer_ids(input: &str) {
    assert_eq!(TimerId::parse(input), None);
}

#[test]
fn timer_id_serde_uses_string_form() {
    let id = TimerId::staff_alert(&TicketId::new("t-1"));
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"staff-alert:t-1\"");
    let parsed: TimerId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);

    assert!(serde_json::from_str::<TimerId>("\"nope\"").is_err());
}

#[test]
fn schedule_every_starts_one_period_out() {
    let schedule = Schedule::every(Duration::from_secs(60));
    assert_eq!(schedule.first_delay(), Duration::from_secs(60));
    assert_eq!(schedule.period(), Some(Duration::from_secs(60)));
    assert_eq!(Schedule::once(Duration::from_secs(5)).period(), None);
}

#[test]
fn schedule_serializes_durations_as_millis() {
    let schedule = Schedule::Every {
        first: Duration::from_millis(1500),
        period: Duration::from_secs(2),
    };
    let json = serde_json::to_string(&schedule).unwrap();
    assert_eq!(json, r#"{"every":{"first":1500,"period":2000}}"#);
    let parsed: Schedule = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, schedule);
}
