// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use nudge_adapters::FakeMessenger;
use nudge_core::test_support::{requester_message, staff_message};
use nudge_core::{FakeClock, Participant, Role, TicketId, TicketState};
use nudge_engine::{CommandReply, RuntimeConfig, RuntimeDeps, TicketCommand};
use nudge_storage::MemoryStore;
use std::time::Duration;
use tempfile::tempdir;

type TestCtx = ListenCtx<FakeMessenger, MemoryStore, FakeClock>;

fn test_ctx() -> TestCtx {
    let runtime = Runtime::new(
        RuntimeDeps {
            messenger: FakeMessenger::new(),
            store: MemoryStore::new(),
        },
        FakeClock::new(),
        RuntimeConfig::new("intake-bot", vec!["ops".to_string()]),
    )
    .unwrap();
    ListenCtx {
        runtime: Arc::new(runtime),
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    }
}

fn staff() -> Participant {
    Participant::new("s-1", Role::Staff)
}

#[tokio::test]
async fn ping_returns_pong() {
    let ctx = test_ctx();
    assert_eq!(handle_request(Request::Ping, &ctx).await, Response::Pong);
}

#[tokio::test]
async fn hello_reports_daemon_version() {
    let ctx = test_ctx();
    let response = handle_request(
        Request::Hello {
            version: "0.0.0".to_string(),
        },
        &ctx,
    )
    .await;
    assert_eq!(
        response,
        Response::Hello {
            version: PROTOCOL_VERSION.to_string()
        }
    );
}

#[tokio::test]
async fn events_reach_the_runtime() {
    let ctx = test_ctx();

    let first = handle_request(
        Request::Event {
            event: requester_message("t-1", "u-1"),
        },
        &ctx,
    )
    .await;
    let second = handle_request(
        Request::Event {
            event: staff_message("t-1", "s-1"),
        },
        &ctx,
    )
    .await;

    assert_eq!(first, Response::Ok);
    assert_eq!(second, Response::Ok);
    let status = ctx.runtime.status(&TicketId::new("t-1")).await.unwrap();
    assert_eq!(status.state, TicketState::PendingStart);
}

#[tokio::test]
async fn command_reply_carries_display_text() {
    let ctx = test_ctx();
    let response = handle_request(
        Request::Command {
            ticket_id: TicketId::new("t-1"),
            invoker: staff(),
            command: TicketCommand::TimerStop,
        },
        &ctx,
    )
    .await;

    assert_eq!(
        response,
        Response::Command {
            message: CommandReply::NotTracked.message(),
            reply: CommandReply::NotTracked,
        }
    );
}

#[tokio::test]
async fn requester_command_is_denied() {
    let ctx = test_ctx();
    let response = handle_request(
        Request::Command {
            ticket_id: TicketId::new("t-1"),
            invoker: Participant::new("u-1", Role::Requester),
            command: TicketCommand::TimerRestart,
        },
        &ctx,
    )
    .await;

    let Response::Command { reply, .. } = response else {
        panic!("expected command response, got {response:?}");
    };
    assert_eq!(reply, CommandReply::Denied);
}

#[tokio::test]
async fn status_counts_tickets_and_timers() {
    let ctx = test_ctx();
    for event in [requester_message("t-1", "u-1"), staff_message("t-1", "s-1")] {
        ctx.runtime.handle_event(event).await.unwrap();
    }

    let response = handle_request(Request::Status, &ctx).await;

    let Response::Status {
        tickets, timers, ..
    } = response
    else {
        panic!("expected status response, got {response:?}");
    };
    assert_eq!(tickets, 1);
    assert_eq!(timers, 1);
}

#[tokio::test]
async fn unknown_ticket_status_is_untracked() {
    let ctx = test_ctx();
    let response = handle_request(
        Request::TicketStatus {
            ticket_id: TicketId::new("nope"),
        },
        &ctx,
    )
    .await;

    let Response::TicketStatus { status } = response else {
        panic!("expected ticket status, got {response:?}");
    };
    assert_eq!(status.state, TicketState::Untracked);
}

#[tokio::test]
async fn store_failure_becomes_error_response() {
    let store = MemoryStore::new();
    store.set_fail_writes(true);
    let runtime = Runtime::new(
        RuntimeDeps {
            messenger: FakeMessenger::new(),
            store,
        },
        FakeClock::new(),
        RuntimeConfig::new("intake-bot", vec!["ops".to_string()]),
    )
    .unwrap();
    let ctx = ListenCtx {
        runtime: Arc::new(runtime),
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    };

    let response = handle_request(
        Request::Event {
            event: requester_message("t-1", "u-1"),
        },
        &ctx,
    )
    .await;

    assert!(matches!(response, Response::Error { .. }), "{response:?}");
}

#[tokio::test]
async fn shutdown_notifies_main_loop() {
    let ctx = test_ctx();
    let notified = ctx.shutdown.clone();

    let response = handle_request(Request::Shutdown, &ctx).await;

    assert_eq!(response, Response::ShuttingDown);
    tokio::time::timeout(Duration::from_secs(1), notified.notified())
        .await
        .unwrap();
}

#[tokio::test]
async fn serves_requests_over_the_socket() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.sock");
    let socket = UnixListener::bind(&path).unwrap();
    let ctx = test_ctx();
    let listener = Listener::new(
        socket,
        Arc::clone(&ctx.runtime),
        ctx.start_time,
        Arc::clone(&ctx.shutdown),
    );
    let task = tokio::spawn(listener.run());

    let stream = UnixStream::connect(&path).await.unwrap();
    let response = protocol::call(stream, &Request::Ping, DEFAULT_TIMEOUT)
        .await
        .unwrap();

    assert_eq!(response, Response::Pong);
    task.abort();
}
