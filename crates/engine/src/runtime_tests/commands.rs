// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Staff commands.

use super::*;
use nudge_core::TimerKind;

#[tokio::test]
async fn non_staff_invokers_are_denied() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    let ops_before = ctx.store.ops().len();

    for role in [Role::Requester, Role::Bot] {
        let reply = ctx
            .runtime
            .handle_command(
                &tid(TICKET),
                &Participant::new("u-9", role),
                TicketCommand::TimerStop,
            )
            .await
            .unwrap();

        assert_eq!(reply, CommandReply::Denied);
        assert_eq!(reply.message(), nudge_core::notice::PERMISSION_DENIED);
    }
    assert_eq!(ctx.store.ops().len(), ops_before);
    assert_eq!(ctx.state(TICKET).await, TicketState::Active);
}

#[tokio::test]
async fn privileged_role_may_run_commands() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;

    let reply = ctx
        .runtime
        .handle_command(
            &tid(TICKET),
            &Participant::new("boss", Role::Privileged),
            TicketCommand::TimerStop,
        )
        .await
        .unwrap();

    assert_eq!(reply, CommandReply::Stopped);
}

// =============================================================================
// timer stop
// =============================================================================

#[tokio::test]
async fn stop_clears_active_countdown() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(7 * HOUR).await;

    let reply = ctx.command(TICKET, TicketCommand::TimerStop).await;

    assert_eq!(reply, CommandReply::Stopped);
    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
    assert_eq!(ctx.record(TICKET).reminder_count, 0);
    assert!(ctx.runtime.live_timers(&tid(TICKET)).is_empty());

    ctx.advance(48 * HOUR).await;
    assert_eq!(ctx.messenger.messages(TICKET).len(), 1);
    assert!(ctx.messenger.alerts(TICKET).is_empty());
}

#[tokio::test]
async fn stop_cancels_pending_start() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.send(staff_message(TICKET, STAFF)).await;

    let reply = ctx.command(TICKET, TicketCommand::TimerStop).await;

    assert_eq!(reply, CommandReply::Stopped);
    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
}

#[tokio::test]
async fn stop_on_idle_ticket_reports_not_running() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;

    let reply = ctx.command(TICKET, TicketCommand::TimerStop).await;

    assert_eq!(reply, CommandReply::NotRunning);
    assert_eq!(reply.message(), "No timer is running.");
}

#[tokio::test]
async fn commands_on_untracked_ticket_report_not_tracked() {
    let ctx = setup();

    for command in [
        TicketCommand::TimerStop,
        TicketCommand::TimerRestart,
        TicketCommand::CreatorCheck,
    ] {
        assert_eq!(ctx.command(TICKET, command).await, CommandReply::NotTracked);
    }
    assert_eq!(ctx.runtime.ticket_count().await.unwrap(), 0);
}

// =============================================================================
// timer restart
// =============================================================================

#[tokio::test]
async fn restart_starts_countdown_immediately() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;

    let reply = ctx.command(TICKET, TicketCommand::TimerRestart).await;

    let now_ms = ctx.clock.epoch_ms();
    assert_eq!(reply, CommandReply::Restarted { started_at_ms: now_ms });
    assert_eq!(ctx.record(TICKET).timer_start_ms, Some(now_ms));
    assert_eq!(
        ctx.runtime.live_timers(&tid(TICKET)),
        vec![TimerKind::Reminder, TimerKind::StaffAlert]
    );
    assert_eq!(ctx.runtime.next_deadline(), Some(ctx.clock.now() + 6 * HOUR));
    assert!(ctx.messenger.calls().is_empty());
}

#[tokio::test]
async fn restart_mid_countdown_resets_reminders() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(13 * HOUR).await;
    assert_eq!(ctx.record(TICKET).reminder_count, 2);

    ctx.command(TICKET, TicketCommand::TimerRestart).await;
    assert_eq!(ctx.record(TICKET).reminder_count, 0);

    ctx.advance(23 * HOUR).await;
    assert_eq!(ctx.messenger.messages(TICKET).len(), 5);
    assert!(ctx.messenger.alerts(TICKET).is_empty());

    ctx.advance(HOUR).await;
    assert_eq!(ctx.messenger.alerts(TICKET).len(), 1);
}

#[tokio::test]
async fn restart_while_escalated_opens_new_epoch() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(25 * HOUR).await;
    assert_eq!(ctx.state(TICKET).await, TicketState::Escalated);

    ctx.command(TICKET, TicketCommand::TimerRestart).await;

    let record = ctx.record(TICKET);
    assert_eq!(record.alerted_at_ms, None);
    assert_eq!(record.reminder_count, 0);
    assert_eq!(ctx.state(TICKET).await, TicketState::Active);

    ctx.advance(24 * HOUR).await;
    assert_eq!(ctx.messenger.alerts(TICKET).len(), 2);
    assert_eq!(ctx.messenger.messages(TICKET).len(), 6);
}

#[tokio::test]
async fn restart_replaces_pending_start() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.send(staff_message(TICKET, STAFF)).await;

    ctx.command(TICKET, TicketCommand::TimerRestart).await;

    assert!(!ctx
        .runtime
        .live_timers(&tid(TICKET))
        .contains(&TimerKind::PendingStart));
    assert_eq!(ctx.state(TICKET).await, TicketState::Active);
}

// =============================================================================
// timer status
// =============================================================================

#[tokio::test]
async fn status_reports_active_countdown() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(7 * HOUR).await;

    let reply = ctx.command(TICKET, TicketCommand::TimerStatus).await;

    let CommandReply::Status(status) = &reply else {
        panic!("expected status, got {reply:?}");
    };
    assert_eq!(status.state, TicketState::Active);
    assert_eq!(status.elapsed_ms, Some(7 * 60 * 60 * 1000));
    assert_eq!(status.reminder_count, 1);
    assert_eq!(status.creator_id, Some(UserId::new(CREATOR)));
    assert_eq!(reply.message(), "Timer running for 7h, 1 reminder(s) sent.");
}

#[tokio::test]
async fn status_reports_pending_and_untracked() {
    let ctx = setup();

    let reply = ctx.command(TICKET, TicketCommand::TimerStatus).await;
    assert!(matches!(reply, CommandReply::Status(ref s) if s.state == TicketState::Untracked));

    ctx.send(requester_message(TICKET, CREATOR)).await;
    ctx.send(staff_message(TICKET, STAFF)).await;

    let status = ctx.runtime.status(&tid(TICKET)).await.unwrap();
    assert_eq!(status.state, TicketState::PendingStart);
    assert_eq!(status.elapsed_ms, None);
}

// =============================================================================
// creator check / assign
// =============================================================================

#[tokio::test]
async fn creator_check_names_recorded_creator() {
    let ctx = setup();
    ctx.send(requester_message(TICKET, CREATOR)).await;

    let reply = ctx.command(TICKET, TicketCommand::CreatorCheck).await;

    assert_eq!(
        reply,
        CommandReply::Creator {
            creator_id: UserId::new(CREATOR)
        }
    );
    assert_eq!(reply.message(), "Ticket creator: <@u-1>");
}

#[tokio::test]
async fn creator_assign_tracks_untracked_ticket() {
    let ctx = setup();

    let reply = ctx
        .command(
            TICKET,
            TicketCommand::CreatorAssign {
                user: UserId::new("u-5"),
            },
        )
        .await;

    assert_eq!(
        reply,
        CommandReply::CreatorAssigned {
            creator_id: UserId::new("u-5"),
            previous: None,
        }
    );
    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
}

#[tokio::test]
async fn creator_assign_keeps_running_countdown() {
    let ctx = setup();
    ctx.start_countdown(TICKET).await;
    ctx.advance(7 * HOUR).await;
    let before = ctx.record(TICKET);

    let reply = ctx
        .command(
            TICKET,
            TicketCommand::CreatorAssign {
                user: UserId::new("u-5"),
            },
        )
        .await;

    assert_eq!(
        reply,
        CommandReply::CreatorAssigned {
            creator_id: UserId::new("u-5"),
            previous: Some(UserId::new(CREATOR)),
        }
    );
    let after = ctx.record(TICKET);
    assert_eq!(after.timer_start_ms, before.timer_start_ms);
    assert_eq!(after.reminder_count, 1);

    // The new creator's reply now clears the countdown
    ctx.send(requester_message(TICKET, CREATOR)).await;
    assert_eq!(ctx.state(TICKET).await, TicketState::Active);
    ctx.send(requester_message(TICKET, "u-5")).await;
    assert_eq!(ctx.state(TICKET).await, TicketState::Idle);
}
