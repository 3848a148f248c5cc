//! Reminder and staff alert schedule for a silent requester

use crate::prelude::*;
use nudge_core::{notice, UserId};

fn reminder(hours: u32, final_warning: bool) -> String {
    notice::reminder(&UserId::new(CREATOR), HOUR * hours, final_warning)
}

#[tokio::test]
async fn silent_requester_gets_three_reminders_then_staff_alert() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;

    daemon.advance(24 * HOUR).await;

    assert_eq!(
        daemon.reminders(TICKET),
        vec![reminder(6, false), reminder(12, false), reminder(18, true)]
    );
    assert_eq!(
        daemon.alerts(TICKET),
        vec!["<@&ops> <@u-1> has not replied in 1d. This ticket needs staff attention.".to_string()]
    );
    assert_eq!(daemon.state(TICKET).await, TicketState::Escalated);
}

#[tokio::test]
async fn escalated_ticket_stays_quiet() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(24 * HOUR).await;

    daemon.advance(72 * HOUR).await;

    assert_eq!(daemon.reminders(TICKET).len(), 3);
    assert_eq!(daemon.alerts(TICKET).len(), 1);
}

#[tokio::test]
async fn requester_reply_stops_the_countdown() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(7 * HOUR).await;

    daemon.send(requester_message(TICKET, CREATOR)).await;
    daemon.advance(48 * HOUR).await;

    assert_eq!(daemon.reminders(TICKET), vec![reminder(6, false)]);
    assert!(daemon.alerts(TICKET).is_empty());
    assert_eq!(daemon.state(TICKET).await, TicketState::Idle);
}

#[tokio::test]
async fn reply_during_pre_delay_never_starts_a_countdown() {
    let daemon = Daemon::start();
    daemon.send(requester_message(TICKET, CREATOR)).await;
    daemon.send(staff_message(TICKET, STAFF)).await;
    daemon.advance(5 * MINUTE).await;

    daemon.send(requester_message(TICKET, CREATOR)).await;
    daemon.advance(48 * HOUR).await;

    assert!(daemon.messenger.calls().is_empty());
    assert_eq!(daemon.state(TICKET).await, TicketState::Idle);
}

#[tokio::test]
async fn staff_follow_up_restarts_the_clock() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(5 * HOUR).await;

    daemon.send(staff_message(TICKET, STAFF)).await;
    assert_eq!(daemon.state(TICKET).await, TicketState::PendingStart);
    daemon.advance(10 * MINUTE).await;
    assert_eq!(daemon.state(TICKET).await, TicketState::Active);

    // The first countdown would have reminded by now
    daemon.advance(5 * HOUR).await;
    assert!(daemon.reminders(TICKET).is_empty());

    daemon.advance(HOUR).await;
    assert_eq!(daemon.reminders(TICKET), vec![reminder(6, false)]);
}

#[tokio::test]
async fn new_conversation_after_escalation_escalates_again() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(24 * HOUR).await;

    daemon.send(requester_message(TICKET, CREATOR)).await;
    assert_eq!(daemon.state(TICKET).await, TicketState::Idle);
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(24 * HOUR).await;

    assert_eq!(daemon.reminders(TICKET).len(), 6);
    assert_eq!(daemon.alerts(TICKET).len(), 2);
}

#[tokio::test]
async fn tickets_escalate_independently() {
    let daemon = Daemon::start();
    daemon.open_and_wait_on_requester("t-a").await;
    daemon.advance(12 * HOUR).await;
    daemon.open_and_wait_on_requester("t-b").await;

    daemon.advance(12 * HOUR).await;

    assert_eq!(daemon.state("t-a").await, TicketState::Escalated);
    assert_eq!(daemon.state("t-b").await, TicketState::Active);
    assert_eq!(daemon.reminders("t-b").len(), 2);
    assert!(daemon.alerts("t-b").is_empty());
}
