//! Daemon restarts: countdowns resume from persisted records

use crate::prelude::*;
use nudge_core::{notice, UserId};

fn reminder(hours: u32, final_warning: bool) -> String {
    notice::reminder(&UserId::new(CREATOR), HOUR * hours, final_warning)
}

#[tokio::test]
async fn restart_keeps_the_original_schedule() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(7 * HOUR).await;

    let (daemon, summary) = daemon.restart(HOUR).await;
    assert_eq!(summary.resumed, 1);

    daemon.advance(4 * HOUR).await;

    assert_eq!(
        daemon.reminders(TICKET),
        vec![reminder(6, false), reminder(12, false)]
    );
}

#[tokio::test]
async fn reminders_missed_while_down_are_not_resent() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(5 * HOUR).await;

    let (daemon, _) = daemon.restart(8 * HOUR).await;
    assert!(daemon.messenger.calls().is_empty());

    // The next deadline is the third and final reminder
    daemon.advance(5 * HOUR).await;
    assert_eq!(daemon.reminders(TICKET), vec![reminder(18, true)]);

    daemon.advance(6 * HOUR).await;
    assert_eq!(daemon.alerts(TICKET).len(), 1);
}

#[tokio::test]
async fn alert_window_passed_while_down_alerts_on_startup() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;

    let (daemon, summary) = daemon.restart(25 * HOUR).await;

    assert_eq!(summary.escalated, 1);
    let alerts = daemon.alerts(TICKET);
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("has not replied in 1d1h"), "{alerts:?}");
    assert!(daemon.reminders(TICKET).is_empty());
    assert_eq!(daemon.state(TICKET).await, TicketState::Escalated);
}

#[tokio::test]
async fn escalated_ticket_is_not_alerted_twice() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(24 * HOUR).await;

    let (daemon, summary) = daemon.restart(HOUR).await;
    daemon.advance(48 * HOUR).await;

    assert_eq!(summary.escalated, 1);
    assert_eq!(daemon.alerts(TICKET).len(), 1);
}

#[tokio::test]
async fn pending_start_does_not_survive_a_restart() {
    let daemon = Daemon::start();
    daemon.send(requester_message(TICKET, CREATOR)).await;
    daemon.send(staff_message(TICKET, STAFF)).await;

    let (daemon, summary) = daemon.restart(MINUTE).await;
    daemon.advance(48 * HOUR).await;

    assert_eq!(summary.idle, 1);
    assert!(daemon.messenger.calls().is_empty());
    assert_eq!(daemon.state(TICKET).await, TicketState::Idle);
}

#[tokio::test]
async fn channel_deleted_while_down_is_forgotten() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.messenger.mark_gone(TICKET);

    let (daemon, summary) = daemon.restart(HOUR).await;

    assert_eq!(summary.orphaned, 1);
    assert_eq!(daemon.state(TICKET).await, TicketState::Untracked);
}
