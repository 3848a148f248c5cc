// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-ticket serialization.

use super::*;

#[tokio::test]
async fn held_ticket_lock_blocks_only_that_ticket() {
    let ctx = setup();
    let guard = ctx.runtime.locks.lock(&tid(TICKET)).await;

    let blocked = tokio::time::timeout(
        Duration::from_millis(50),
        ctx.runtime.handle_event(requester_message(TICKET, CREATOR)),
    )
    .await;
    assert!(blocked.is_err(), "same-ticket event should wait for the lock");

    let other = tokio::time::timeout(
        Duration::from_millis(50),
        ctx.runtime.handle_event(requester_message("t-2", CREATOR)),
    )
    .await;
    assert!(matches!(other, Ok(Ok(()))));

    drop(guard);
    ctx.send(requester_message(TICKET, CREATOR)).await;
    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
}

#[tokio::test]
async fn interleaved_events_apply_in_arrival_order() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.store.set_write_delay(Some(Duration::from_millis(5)));

    let (a, b, c) = tokio::join!(
        ctx.runtime.handle_event(requester_message(TICKET, CREATOR)),
        ctx.runtime.handle_event(staff_message(TICKET, STAFF)),
        ctx.runtime.handle_event(requester_message(TICKET, CREATOR)),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let record = ctx.record(TICKET);
    assert!(record.invariants_hold());
    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());
}

#[tokio::test]
async fn firing_cancelled_before_handling_is_discarded() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;

    ctx.clock.advance(6 * HOUR);
    let fired = ctx.runtime.fired_timers();
    assert_eq!(fired.len(), 1);

    // Staff speaks between the firing and its handling
    ctx.send(staff_message(TICKET, STAFF)).await;
    for event in fired {
        ctx.send(event).await;
    }

    assert!(ctx.messenger.messages(TICKET).is_empty());
    assert_eq!(ctx.record(TICKET).reminder_count, 0);
    assert_eq!(ctx.state(TICKET).await, TicketState::PendingStart);
}

#[tokio::test]
async fn spawned_handlers_track_many_tickets() {
    let ctx = setup();
    ctx.store.set_write_delay(Some(Duration::from_millis(2)));
    let runtime = Arc::new(ctx.runtime);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let runtime = Arc::clone(&runtime);
            tokio::spawn(async move {
                runtime
                    .handle_event(requester_message(&format!("t-{i}"), &format!("u-{i}")))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(runtime.ticket_count().await.unwrap(), 20);
    assert_eq!(
        ctx.store.record("t-7").map(|r| r.creator_id),
        Some(UserId::new("u-7"))
    );
    assert!(runtime.locks.is_empty());
}
