// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn reminder_mentions_creator_and_elapsed() {
    let text = reminder(&UserId::new("42"), Duration::from_secs(6 * 3600), false);
    assert!(text.starts_with("<@42> Reminder:"), "got: {}", text);
    assert!(text.contains("6h"), "got: {}", text);
}

#[test]
fn final_reminder_uses_warning_copy() {
    let text = reminder(&UserId::new("42"), Duration::from_secs(18 * 3600), true);
    assert!(text.contains("Final reminder"), "got: {}", text);
    assert!(text.contains("escalated"), "got: {}", text);
}

#[test]
fn staff_alert_mentions_roles() {
    let roles = vec!["100".to_string(), "200".to_string()];
    let text = staff_alert(&UserId::new("42"), &roles, Duration::from_secs(86_400));
    assert!(text.starts_with("<@&100> <@&200> <@42>"), "got: {}", text);
    assert!(text.contains("1d"), "got: {}", text);
}

#[test]
fn staff_alert_without_roles() {
    let text = staff_alert(&UserId::new("7"), &[], Duration::from_secs(90_000));
    assert!(text.starts_with("<@7> has not replied"), "got: {}", text);
}

#[test]
fn timer_status_active_reports_elapsed_and_count() {
    let text = timer_status(TicketState::Active, Some(Duration::from_secs(7 * 3600)), 1);
    assert_eq!(text, "Timer running for 7h, 1 reminder(s) sent.");
}

#[test]
fn timer_status_idle_and_untracked() {
    assert_eq!(timer_status(TicketState::Idle, None, 0), "No timer is running.");
    assert!(timer_status(TicketState::Untracked, None, 0).contains("not a tracked ticket"));
    assert!(timer_status(TicketState::PendingStart, None, 0).starts_with("Timer pending"));
}

#[test]
fn timer_status_escalated() {
    let text = timer_status(TicketState::Escalated, Some(Duration::from_secs(86_400)), 3);
    assert!(text.starts_with("Escalated to staff."), "got: {}", text);
    assert!(text.contains("3 reminder(s)"), "got: {}", text);
}

#[test]
fn creator_status_mentions_user() {
    assert_eq!(
        creator_status(Some(&UserId::new("42"))),
        "Ticket creator: <@42>"
    );
    assert!(creator_status(None).contains("not a tracked ticket"));
}
