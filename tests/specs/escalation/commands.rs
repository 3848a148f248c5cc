//! Staff commands against live countdowns

use crate::prelude::*;

#[tokio::test]
async fn timer_stop_silences_the_ticket() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;

    let reply = daemon.command(TICKET, TicketCommand::TimerStop).await;
    daemon.advance(48 * HOUR).await;

    assert_eq!(reply, CommandReply::Stopped);
    assert!(daemon.messenger.calls().is_empty());
    assert_eq!(daemon.state(TICKET).await, TicketState::Idle);
}

#[tokio::test]
async fn timer_restart_rearms_an_escalated_ticket() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(24 * HOUR).await;

    let reply = daemon.command(TICKET, TicketCommand::TimerRestart).await;
    daemon.advance(24 * HOUR).await;

    assert!(matches!(reply, CommandReply::Restarted { .. }));
    assert_eq!(daemon.alerts(TICKET).len(), 2);
}

#[tokio::test]
async fn requester_cannot_stop_the_timer() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;

    let reply = daemon
        .runtime
        .handle_command(
            &TicketId::new(TICKET),
            &Participant::new(CREATOR, Role::Requester),
            TicketCommand::TimerStop,
        )
        .await
        .unwrap();
    daemon.advance(6 * HOUR).await;

    assert_eq!(reply, CommandReply::Denied);
    assert_eq!(daemon.reminders(TICKET).len(), 1);
}

#[tokio::test]
async fn reassigned_creator_receives_the_reminders() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;

    daemon
        .command(
            TICKET,
            TicketCommand::CreatorAssign {
                user: "u-2".into(),
            },
        )
        .await;
    daemon.advance(6 * HOUR).await;

    let reminders = daemon.reminders(TICKET);
    assert_eq!(reminders.len(), 1);
    assert!(reminders[0].starts_with("<@u-2> "), "{reminders:?}");
}
