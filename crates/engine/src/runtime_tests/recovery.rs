// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup recovery from persisted records.

use super::*;
use nudge_core::test_support::{idle_record, running_record};
use nudge_core::TimerKind;

#[tokio::test]
async fn resumed_countdown_keeps_original_deadlines() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    let started = ctx.clock.now();
    ctx.advance(8 * HOUR).await;

    let next = ctx.restart();
    let summary = next.runtime.recover().await.unwrap();

    assert_eq!(
        summary,
        RecoverySummary {
            resumed: 1,
            ..Default::default()
        }
    );
    assert_eq!(next.runtime.next_deadline(), Some(started + 12 * HOUR));
    assert_eq!(
        next.runtime.live_timers(&tid(TICKET)),
        vec![TimerKind::Reminder, TimerKind::StaffAlert]
    );
}

#[tokio::test]
async fn restart_produces_same_notices_as_uninterrupted_run() {
    let uninterrupted = setup();
    uninterrupted.start_countdown(TICKET).await;
    uninterrupted.advance(25 * HOUR).await;

    let first = setup();
    first.start_countdown(TICKET).await;
    first.advance(8 * HOUR).await;
    let second = first.restart();
    second.runtime.recover().await.unwrap();
    second.advance(17 * HOUR).await;

    assert_eq!(
        second.messenger.messages(TICKET),
        uninterrupted.messenger.messages(TICKET)
    );
    assert_eq!(
        second.messenger.alerts(TICKET),
        uninterrupted.messenger.alerts(TICKET)
    );
    assert_eq!(second.record(TICKET), uninterrupted.record(TICKET));
}

#[tokio::test]
async fn reminders_missed_while_down_are_counted_not_resent() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    let started = ctx.clock.now();
    ctx.advance(7 * HOUR).await;
    ctx.clock.advance(6 * HOUR);

    let next = ctx.restart();
    next.runtime.recover().await.unwrap();

    assert_eq!(next.messenger.messages(TICKET).len(), 1);
    assert_eq!(next.record(TICKET).reminder_count, 2);
    assert_eq!(next.runtime.next_deadline(), Some(started + 18 * HOUR));

    next.advance(5 * HOUR).await;
    let messages = next.messenger.messages(TICKET);
    assert_eq!(messages.len(), 2);
    assert!(messages[1].contains("**Final reminder:**"));
}

#[tokio::test]
async fn reminder_due_within_tolerance_fires_on_recovery() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    let started = ctx.clock.now();
    ctx.advance(7 * HOUR).await;
    ctx.clock.advance(5 * HOUR - Duration::from_millis(500));

    let next = ctx.restart();
    next.runtime.recover().await.unwrap();

    assert_eq!(next.messenger.messages(TICKET).len(), 2);
    assert_eq!(next.record(TICKET).reminder_count, 2);
    assert_eq!(next.runtime.next_deadline(), Some(started + 18 * HOUR));
}

#[tokio::test]
async fn expired_alert_window_escalates_on_recovery() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(7 * HOUR).await;
    ctx.clock.advance(18 * HOUR);

    let next = ctx.restart();
    let summary = next.runtime.recover().await.unwrap();

    assert_eq!(summary.escalated, 1);
    assert_eq!(next.messenger.messages(TICKET).len(), 1);
    assert_eq!(
        next.messenger.alerts(TICKET),
        vec!["<@&ops> <@u-1> has not replied in 1d1h. This ticket needs staff attention.".to_string()]
    );
    assert_eq!(next.state(TICKET).await, TicketState::Escalated);
    assert!(next.runtime.live_timers(&tid(TICKET)).is_empty());
}

#[tokio::test]
async fn escalated_record_is_not_alerted_again() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(24 * HOUR).await;

    let next = ctx.restart();
    let summary = next.runtime.recover().await.unwrap();
    next.advance(48 * HOUR).await;

    assert_eq!(summary.escalated, 1);
    assert_eq!(next.messenger.alerts(TICKET).len(), 1);
    assert!(next.runtime.live_timers(&tid(TICKET)).is_empty());
}

#[tokio::test]
async fn missing_channel_is_orphaned_without_alert() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.clock.advance(25 * HOUR);
    ctx.messenger.mark_gone(TICKET);

    let next = ctx.restart();
    let summary = next.runtime.recover().await.unwrap();

    assert_eq!(summary.orphaned, 1);
    assert!(next.messenger.alerts(TICKET).is_empty());
    assert_eq!(next.state(TICKET).await, TicketState::Untracked);
}

#[tokio::test]
async fn lookup_failure_still_resumes() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(HOUR).await;
    ctx.messenger.set_fail_lookups(true);

    let next = ctx.restart();
    let summary = next.runtime.recover().await.unwrap();

    assert_eq!(summary.resumed, 1);
    assert!(next.runtime.has_live_timers(&tid(TICKET)));
}

#[tokio::test]
async fn idle_and_pending_tickets_recover_idle() {
    let ctx = setup();
    ctx.send(requester_message("t-idle", CREATOR)).await;
    ctx.send(requester_message("t-pending", CREATOR)).await;
    ctx.send(staff_message("t-pending", STAFF)).await;

    let next = ctx.restart();
    let summary = next.runtime.recover().await.unwrap();

    assert_eq!(summary.idle, 2);
    assert_eq!(next.state("t-pending").await, TicketState::Idle);
    next.advance(HOUR).await;
    assert_eq!(next.state("t-pending").await, TicketState::Idle);
}

#[tokio::test]
async fn seeded_records_resume_from_their_start_time() {
    let clock = FakeClock::new();
    let two_hours_ago = clock.epoch_ms() - 2 * 60 * 60 * 1000;
    let store = MemoryStore::with_records([
        running_record("t-a", CREATOR, two_hours_ago, 0),
        idle_record("t-b", CREATOR),
    ]);
    let ctx = build(clock, FakeMessenger::new(), store, test_config());

    let summary = ctx.runtime.recover().await.unwrap();

    assert_eq!(summary.resumed, 1);
    assert_eq!(summary.idle, 1);
    assert_eq!(ctx.runtime.next_deadline(), Some(ctx.clock.now() + 4 * HOUR));
}

#[tokio::test]
async fn store_failure_fails_only_that_ticket() {
    let clock = FakeClock::new();
    let long_ago = clock.epoch_ms() - 25 * 60 * 60 * 1000;
    let store = MemoryStore::with_records([
        running_record("t-a", CREATOR, long_ago, 3),
        idle_record("t-b", CREATOR),
    ]);
    store.set_fail_writes(true);
    let ctx = build(clock, FakeMessenger::new(), store, test_config());

    let summary = ctx.runtime.recover().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.idle, 1);
    // Persist failed, so the alert was never sent
    assert!(ctx.messenger.alerts("t-a").is_empty());
}

#[tokio::test]
async fn elapsed_time_is_measured_after_the_channel_lookup() {
    let clock = FakeClock::new();
    let almost_a_day_ago = clock.epoch_ms() - (24 * 60 - 1) * 60 * 1000;
    let store = MemoryStore::with_records([running_record(TICKET, CREATOR, almost_a_day_ago, 3)]);
    let messenger = FakeMessenger::new();
    let lookup_clock = clock.clone();
    messenger.set_on_lookup(move || lookup_clock.advance(2 * MINUTE));
    let ctx = build(clock, messenger, store, test_config());

    let summary = ctx.runtime.recover().await.unwrap();

    assert_eq!(summary.escalated, 1);
    assert_eq!(ctx.messenger.alerts(TICKET).len(), 1);
    assert!(ctx.record(TICKET).is_escalated());
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());
}

#[tokio::test]
async fn recovery_keeps_lock_entries_only_for_armed_tickets() {
    let clock = FakeClock::new();
    let an_hour_ago = clock.epoch_ms() - 60 * 60 * 1000;
    let mut escalated = running_record("t-escalated", CREATOR, an_hour_ago, 0);
    escalated.record_alert(clock.epoch_ms());
    let store = MemoryStore::with_records([
        running_record("t-running", CREATOR, an_hour_ago, 0),
        running_record("t-gone", CREATOR, an_hour_ago, 0),
        escalated,
        idle_record("t-idle", CREATOR),
    ]);
    let messenger = FakeMessenger::new();
    messenger.mark_gone("t-gone");
    let ctx = build(clock, messenger, store, test_config());

    let summary = ctx.runtime.recover().await.unwrap();

    assert_eq!(
        summary,
        RecoverySummary {
            resumed: 1,
            escalated: 1,
            orphaned: 1,
            idle: 1,
            failed: 0,
        }
    );
    assert_eq!(ctx.runtime.locks.len(), 1);
}
