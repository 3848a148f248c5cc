// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-delay, reminder loop and staff alert.

use super::*;
use nudge_core::TimerKind;

// =============================================================================
// Pre-delay
// =============================================================================

#[tokio::test]
async fn staff_message_arms_pending_start() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;

    ctx.send(staff_message(TICKET, STAFF)).await;

    assert_eq!(ctx.state(TICKET).await, TicketState::PendingStart);
    assert_eq!(
        ctx.runtime.live_timers(&tid(TICKET)),
        vec![TimerKind::PendingStart]
    );
    // Nothing persisted for the pending window
    assert!(!ctx.record(TICKET).is_running());
}

#[tokio::test]
async fn pending_start_becomes_active_after_pre_delay() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.send(staff_message(TICKET, STAFF)).await;

    ctx.advance(10 * MINUTE - Duration::from_secs(1)).await;
    assert_eq!(ctx.state(TICKET).await, TicketState::PendingStart);

    ctx.advance(Duration::from_secs(1)).await;
    let record = ctx.record(TICKET);
    assert_eq!(record.timer_start_ms, Some(ctx.clock.epoch_ms()));
    assert_eq!(record.reminder_count, 0);
    assert_eq!(
        ctx.runtime.live_timers(&tid(TICKET)),
        vec![TimerKind::Reminder, TimerKind::StaffAlert]
    );
    assert!(ctx.messenger.calls().is_empty());
}

#[tokio::test]
async fn staff_messages_debounce_pending_start() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.send(staff_message(TICKET, STAFF)).await;

    ctx.advance(5 * MINUTE).await;
    ctx.send(staff_message(TICKET, "s-2")).await;

    ctx.advance(7 * MINUTE).await;
    assert_eq!(ctx.state(TICKET).await, TicketState::PendingStart);

    ctx.advance(3 * MINUTE).await;
    assert_eq!(ctx.state(TICKET).await, TicketState::Active);
}

#[tokio::test]
async fn requester_reply_during_pre_delay_cancels_start() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.send(staff_message(TICKET, STAFF)).await;

    ctx.advance(4 * MINUTE).await;
    ctx.send(requester_message(TICKET, CREATOR)).await;

    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
    ctx.advance(HOUR).await;
    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
}

#[tokio::test]
async fn staff_message_while_active_resets_countdown() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(7 * HOUR).await;
    assert_eq!(ctx.record(TICKET).reminder_count, 1);

    ctx.send(staff_message(TICKET, STAFF)).await;

    let record = ctx.record(TICKET);
    assert_eq!(record.timer_start_ms, None);
    assert_eq!(record.reminder_count, 0);
    assert_eq!(ctx.state(TICKET).await, TicketState::PendingStart);
    assert_eq!(
        ctx.runtime.live_timers(&tid(TICKET)),
        vec![TimerKind::PendingStart]
    );
}

// =============================================================================
// Requester activity
// =============================================================================

#[tokio::test]
async fn requester_reply_returns_active_ticket_to_idle() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(13 * HOUR).await;

    ctx.send(requester_message(TICKET, CREATOR)).await;

    let record = ctx.record(TICKET);
    assert_eq!(record.timer_start_ms, None);
    assert_eq!(record.reminder_count, 0);
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());

    ctx.messenger.clear();
    ctx.advance(48 * HOUR).await;
    assert!(ctx.messenger.calls().is_empty());
}

#[tokio::test]
async fn other_users_do_not_stop_the_countdown() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;

    ctx.send(requester_message(TICKET, "bystander")).await;
    ctx.send(message_event(TICKET, CREATOR, Role::Bot)).await;

    assert_eq!(ctx.state(TICKET).await, TicketState::Active);
}

#[tokio::test]
async fn staff_creator_message_restarts_pending_instead_of_clearing() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.command(
        TICKET,
        TicketCommand::CreatorAssign {
            user: UserId::new(STAFF),
        },
    )
    .await;

    ctx.send(staff_message(TICKET, STAFF)).await;

    assert_eq!(ctx.state(TICKET).await, TicketState::PendingStart);
}

// =============================================================================
// Reminders and alert
// =============================================================================

#[tokio::test]
async fn full_escalation_schedule() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;

    ctx.advance(6 * HOUR - Duration::from_secs(1)).await;
    assert!(ctx.messenger.messages(TICKET).is_empty());

    ctx.advance(Duration::from_secs(1)).await;
    let messages = ctx.messenger.messages(TICKET);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("<@u-1> Reminder: staff replied 6h ago"));

    ctx.advance(6 * HOUR).await;
    assert_eq!(ctx.messenger.messages(TICKET).len(), 2);

    ctx.advance(6 * HOUR).await;
    let messages = ctx.messenger.messages(TICKET);
    assert_eq!(messages.len(), 3);
    assert!(messages[2].contains("**Final reminder:**"));
    assert!(messages[2].contains("18h"));
    assert_eq!(ctx.record(TICKET).reminder_count, 3);

    ctx.advance(6 * HOUR).await;
    // The reminder slot at 24h yields to the alert
    assert_eq!(ctx.messenger.messages(TICKET).len(), 3);
    let alerts = ctx.messenger.alerts(TICKET);
    assert_eq!(
        alerts,
        vec!["<@&ops> <@u-1> has not replied in 1d. This ticket needs staff attention.".to_string()]
    );

    let record = ctx.record(TICKET);
    assert_eq!(record.alerted_at_ms, Some(ctx.clock.epoch_ms()));
    assert_eq!(ctx.state(TICKET).await, TicketState::Escalated);
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());
}

#[tokio::test]
async fn staff_alert_fires_exactly_once() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;

    ctx.advance(24 * HOUR).await;
    ctx.advance(72 * HOUR).await;

    assert_eq!(ctx.messenger.alerts(TICKET).len(), 1);
    assert_eq!(ctx.messenger.messages(TICKET).len(), 3);
    assert_eq!(ctx.state(TICKET).await, TicketState::Escalated);
}

#[tokio::test]
async fn escalated_ticket_restarts_cycle_on_staff_message() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(24 * HOUR).await;

    ctx.send(staff_message(TICKET, STAFF)).await;
    assert!(!ctx.record(TICKET).is_escalated());
    ctx.advance(10 * MINUTE + 24 * HOUR).await;

    assert_eq!(ctx.messenger.alerts(TICKET).len(), 2);
}

#[tokio::test]
async fn tickets_run_independent_countdowns() {
    let ctx = setup();
    ctx.start_countdown("t-a").await;
    ctx.advance(3 * HOUR).await;
    ctx.start_countdown("t-b").await;

    ctx.advance(3 * HOUR).await;
    assert_eq!(ctx.messenger.messages("t-a").len(), 1);
    assert!(ctx.messenger.messages("t-b").is_empty());

    ctx.advance(3 * HOUR).await;
    assert_eq!(ctx.messenger.messages("t-b").len(), 1);
}

// =============================================================================
// Delivery failures
// =============================================================================

#[tokio::test]
async fn failed_delivery_does_not_stop_schedule() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.messenger.set_fail_sends(true);

    ctx.advance(6 * HOUR).await;
    assert_eq!(ctx.messenger.failed_sends(), 1);
    assert_eq!(ctx.record(TICKET).reminder_count, 1);

    ctx.messenger.set_fail_sends(false);
    ctx.advance(18 * HOUR).await;

    assert_eq!(ctx.messenger.messages(TICKET).len(), 2);
    assert_eq!(ctx.messenger.alerts(TICKET).len(), 1);
}

#[tokio::test]
async fn failed_alert_delivery_still_escalates_once() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(18 * HOUR).await;
    ctx.messenger.set_fail_sends(true);

    ctx.advance(6 * HOUR).await;
    ctx.messenger.set_fail_sends(false);
    ctx.advance(24 * HOUR).await;

    assert!(ctx.messenger.alerts(TICKET).is_empty());
    assert!(ctx.record(TICKET).is_escalated());
}

#[tokio::test]
async fn gone_channel_on_send_forgets_ticket() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.messenger.mark_gone(TICKET);

    ctx.advance(6 * HOUR).await;

    assert_eq!(ctx.state(TICKET).await, TicketState::Untracked);
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());
}
