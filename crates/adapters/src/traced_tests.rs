// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::messenger::FakeMessenger;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn assert_log(logs: &str, label: &str, expected: &str) {
    assert!(logs.contains(expected), "Should log {label}. Logs:\n{logs}");
}

#[test]
#[serial(tracing)]
fn send_logs_span_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedMessenger::new(FakeMessenger::new());
        traced.send_message(&TicketId::new("t-7"), "hi").await
    });

    assert!(result.is_ok());
    assert_log(&logs, "span name", "messenger.send");
    assert_log(&logs, "ticket field", "t-7");
    assert_log(&logs, "completion", "message sent");
    assert_log(&logs, "timing", "elapsed_ms");
}

#[test]
#[serial(tracing)]
fn failed_alert_is_logged() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeMessenger::new();
        fake.set_fail_sends(true);
        let traced = TracedMessenger::new(fake);
        traced
            .send_alert(&TicketId::new("t-7"), &["ops".into()], "alert")
            .await
    });

    assert!(result.is_err());
    assert_log(&logs, "span name", "messenger.alert");
    assert_log(&logs, "failure", "alert failed");
}

#[test]
#[serial(tracing)]
fn lookup_failure_is_logged() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeMessenger::new();
        fake.set_fail_lookups(true);
        TracedMessenger::new(fake)
            .ticket_exists(&TicketId::new("t-7"))
            .await
    });

    assert!(result.is_err());
    assert_log(&logs, "failure", "lookup failed");
}

#[tokio::test]
async fn delegates_to_inner() {
    let fake = FakeMessenger::new();
    let traced = TracedMessenger::new(fake.clone());

    traced
        .send_message(&TicketId::new("t-1"), "reminder")
        .await
        .unwrap();
    fake.mark_gone("t-2");

    assert_eq!(fake.messages("t-1"), vec!["reminder"]);
    assert!(!traced.ticket_exists(&TicketId::new("t-2")).await.unwrap());
}
