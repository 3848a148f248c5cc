// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store failures and timeouts.

use super::*;

#[tokio::test]
async fn persist_failure_aborts_countdown_start() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.send(staff_message(TICKET, STAFF)).await;
    ctx.store.set_fail_writes(true);

    let errors = ctx.try_advance(10 * MINUTE).await;

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], RuntimeError::Store(_)));
    assert!(!ctx.record(TICKET).is_running());
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());

    ctx.store.set_fail_writes(false);
    ctx.advance(48 * HOUR).await;
    assert!(ctx.messenger.calls().is_empty());
}

#[tokio::test]
async fn persist_failure_suppresses_reminder() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.store.set_fail_writes(true);

    let errors = ctx.try_advance(6 * HOUR).await;
    assert_eq!(errors.len(), 1);
    assert!(ctx.messenger.messages(TICKET).is_empty());

    // The loop stays armed and the next slot goes out normally
    ctx.store.set_fail_writes(false);
    ctx.advance(6 * HOUR).await;
    assert_eq!(ctx.messenger.messages(TICKET).len(), 1);
    assert_eq!(ctx.record(TICKET).reminder_count, 1);
}

#[tokio::test]
async fn persist_failure_suppresses_alert() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(18 * HOUR).await;
    ctx.store.set_fail_writes(true);

    let errors = ctx.try_advance(6 * HOUR).await;

    assert_eq!(errors.len(), 1);
    assert!(ctx.messenger.alerts(TICKET).is_empty());
    assert!(!ctx.record(TICKET).is_escalated());
}

#[tokio::test]
async fn persist_failure_on_stop_keeps_timers() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.store.set_fail_writes(true);

    let result = ctx
        .runtime
        .handle_command(
            &tid(TICKET),
            &Participant::new(STAFF, Role::Staff),
            TicketCommand::TimerStop,
        )
        .await;

    assert!(result.is_err());
    assert!(ctx.runtime.has_live_timers(&tid(TICKET)));
    assert!(ctx.record(TICKET).is_running());
}

/// Store calls time out after 20ms; tests add write delays as needed
fn slow_store_context() -> TestContext {
    let mut config = test_config();
    config.store_timeout = Duration::from_millis(20);
    build(FakeClock::new(), FakeMessenger::new(), MemoryStore::new(), config)
}

#[tokio::test]
async fn slow_store_times_out() {
    let ctx = slow_store_context();
    ctx.store.set_write_delay(Some(Duration::from_millis(100)));

    let result = ctx
        .runtime
        .handle_event(requester_message(TICKET, CREATOR))
        .await;

    assert!(matches!(
        result,
        Err(RuntimeError::StoreTimeout { op: "upsert", .. })
    ));
    assert!(ctx.store.record(TICKET).is_none());

    // The write was not abandoned and lands later
    ctx.wait_until(|ctx| ctx.store.record(TICKET).is_some()).await;
    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
    assert!(!ctx.runtime.has_live_timers(&tid(TICKET)));
}

#[tokio::test]
async fn countdown_start_that_lands_after_timeout_is_armed() {
    let ctx = slow_store_context();
    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.send(staff_message(TICKET, STAFF)).await;
    ctx.store.set_write_delay(Some(Duration::from_millis(100)));

    let errors = ctx.try_advance(10 * MINUTE).await;

    assert!(matches!(
        errors.as_slice(),
        [RuntimeError::StoreTimeout { op: "upsert", .. }]
    ));
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());

    ctx.wait_until(|ctx| ctx.runtime.has_live_timers(&tid(TICKET))).await;
    ctx.store.set_write_delay(None);

    assert!(ctx.record(TICKET).is_running());
    assert_eq!(ctx.state(TICKET).await, TicketState::Active);
    assert_eq!(
        ctx.runtime.live_timers(&tid(TICKET)),
        vec![TimerKind::Reminder, TimerKind::StaffAlert]
    );

    ctx.advance(24 * HOUR).await;
    assert_eq!(ctx.messenger.messages(TICKET).len(), 3);
    assert_eq!(ctx.messenger.alerts(TICKET).len(), 1);
}

#[tokio::test]
async fn delete_that_lands_after_timeout_cancels_timers() {
    let ctx = slow_store_context();
    ctx.start_countdown(TICKET).await;
    ctx.store.set_write_delay(Some(Duration::from_millis(100)));

    let result = ctx.runtime.handle_event(ticket_deleted(TICKET)).await;

    assert!(matches!(
        result,
        Err(RuntimeError::StoreTimeout { op: "delete", .. })
    ));

    ctx.wait_until(|ctx| !ctx.runtime.has_live_timers(&tid(TICKET))).await;
    assert!(ctx.store.record(TICKET).is_none());

    ctx.advance(48 * HOUR).await;
    assert!(ctx.messenger.calls().is_empty());
}

#[tokio::test]
async fn failed_late_write_leaves_timers_matching_store() {
    let ctx = slow_store_context();
    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.send(staff_message(TICKET, STAFF)).await;
    ctx.store.set_write_delay(Some(Duration::from_millis(60)));
    ctx.store.set_fail_writes(true);

    let errors = ctx.try_advance(10 * MINUTE).await;
    assert_eq!(errors.len(), 1);

    // Give the write time to fail and the settle pass time to run
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(!ctx.record(TICKET).is_running());
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());
    assert!(ctx.runtime.locks.is_empty());
}
