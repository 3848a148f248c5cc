// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tokio::process::Command;

#[tokio::test]
#[serial(hook)]
async fn captures_stdout() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
#[serial(hook)]
async fn nonzero_exit_is_not_an_error() {
    let cmd = Command::new("false");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "false")
        .await
        .unwrap();
    assert!(!output.status.success());
}

#[tokio::test]
#[serial(hook)]
async fn missing_binary_is_an_error() {
    let cmd = Command::new("/nonexistent/hook");
    let err = run_with_timeout(cmd, Duration::from_secs(5), "hook send")
        .await
        .unwrap_err();
    assert!(err.starts_with("hook send failed:"), "got: {}", err);
}

#[tokio::test]
#[serial(hook)]
async fn slow_command_times_out() {
    let mut cmd = Command::new("sleep");
    cmd.arg("10").kill_on_drop(true);
    let err = run_with_timeout(cmd, Duration::from_millis(100), "hook exists")
        .await
        .unwrap_err();
    assert!(err.contains("timed out after 100ms"), "got: {}", err);
}
