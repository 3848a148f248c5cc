// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn record() -> TicketRecord {
    TicketRecord::new(TicketId::new("t-1"), UserId::new("u-1"))
}

#[test]
fn new_record_is_idle() {
    let r = record();
    assert!(!r.is_running());
    assert_eq!(r.reminder_count, 0);
    assert_eq!(TicketState::derive(Some(&r), false), TicketState::Idle);
    assert!(r.invariants_hold());
}

#[test]
fn start_timer_resets_counters() {
    let mut r = record();
    r.start_timer(1_000);
    r.record_reminder();
    r.record_alert(2_000);

    r.start_timer(5_000);

    assert_eq!(r.timer_start_ms, Some(5_000));
    assert_eq!(r.reminder_count, 0);
    assert_eq!(r.alerted_at_ms, None);
}

#[test]
fn record_reminder_requires_running_timer() {
    let mut r = record();
    assert_eq!(r.record_reminder(), None);
    assert_eq!(r.reminder_count, 0);

    r.start_timer(0);
    assert_eq!(r.record_reminder(), Some(1));
    assert_eq!(r.record_reminder(), Some(2));
    assert!(r.invariants_hold());
}

#[test]
fn record_alert_is_exactly_once_per_epoch() {
    let mut r = record();
    assert!(!r.record_alert(10), "no alert without a countdown");

    r.start_timer(0);
    assert!(r.record_alert(10));
    assert!(!r.record_alert(20));
    assert_eq!(r.alerted_at_ms, Some(10));

    r.start_timer(30);
    assert!(r.record_alert(40), "a new epoch can alert again");
}

#[test]
fn clear_timer_reports_whether_anything_changed() {
    let mut r = record();
    assert!(!r.clear_timer());

    r.start_timer(0);
    r.record_reminder();
    assert!(r.clear_timer());
    assert_eq!(r.timer_start_ms, None);
    assert_eq!(r.reminder_count, 0);
    assert!(r.invariants_hold());
}

#[test]
fn reconcile_only_raises_count() {
    let mut r = record();
    assert!(!r.reconcile_reminders(3), "idle records are never reconciled");

    r.start_timer(0);
    r.record_reminder();
    assert!(r.reconcile_reminders(3));
    assert_eq!(r.reminder_count, 3);
    assert!(!r.reconcile_reminders(2));
    assert_eq!(r.reminder_count, 3);
}

#[test]
fn elapsed_saturates_on_clock_skew() {
    let mut r = record();
    assert_eq!(r.elapsed_ms(100), None);
    r.start_timer(500);
    assert_eq!(r.elapsed_ms(800), Some(300));
    assert_eq!(r.elapsed_ms(100), Some(0));
}

#[test]
fn state_derivation() {
    let mut r = record();
    assert_eq!(TicketState::derive(None, true), TicketState::Untracked);
    assert_eq!(TicketState::derive(Some(&r), true), TicketState::PendingStart);

    r.start_timer(0);
    assert_eq!(TicketState::derive(Some(&r), false), TicketState::Active);

    r.record_alert(1);
    assert_eq!(TicketState::derive(Some(&r), false), TicketState::Escalated);
}

#[test]
fn record_serde_omits_empty_timer_fields() {
    let r = record();
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(json, r#"{"id":"t-1","creator_id":"u-1","reminder_count":0}"#);

    let parsed: TicketRecord = serde_json::from_str(r#"{"id":"t-1","creator_id":"u-1"}"#).unwrap();
    assert_eq!(parsed, r);
}
