// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messenger that shells out to a bridge hook command.
//!
//! Invocations:
//!
//! ```text
//! $HOOK send   <ticket>             # body in NUDGE_CONTENT
//! $HOOK alert  <ticket> <role>...   # body in NUDGE_CONTENT
//! $HOOK exists <ticket>
//! ```
//!
//! Exit 0 is success (or "exists"), exit 3 means the channel is gone, any
//! other status is a failure.

use super::{Messenger, MessengerError};
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use nudge_core::TicketId;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Exit status the hook uses for a deleted channel
pub const EXIT_GONE: i32 = 3;

/// Environment variable carrying the message body
pub const CONTENT_ENV: &str = "NUDGE_CONTENT";

#[derive(Clone, Debug)]
pub struct HookMessenger {
    program: PathBuf,
    timeout: Duration,
}

enum HookStatus {
    Ok,
    Gone,
    Failed(String),
}

impl HookMessenger {
    /// Hook at `program`, with the timeout from the environment
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: crate::env::hook_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    async fn invoke(
        &self,
        action: &str,
        ticket: &TicketId,
        extra: &[String],
        content: Option<&str>,
    ) -> Result<HookStatus, String> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(action)
            .arg(ticket.as_str())
            .args(extra)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(content) = content {
            cmd.env(CONTENT_ENV, content);
        }

        let description = format!("hook {action}");
        let output = run_with_timeout(cmd, self.timeout, &description).await?;
        Ok(classify(&output))
    }
}

fn classify(output: &Output) -> HookStatus {
    match output.status.code() {
        Some(0) => HookStatus::Ok,
        Some(EXIT_GONE) => HookStatus::Gone,
        code => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
            HookStatus::Failed(format!("exit {status}: {}", stderr.trim()))
        }
    }
}

#[async_trait]
impl Messenger for HookMessenger {
    async fn send_message(&self, ticket: &TicketId, content: &str) -> Result<(), MessengerError> {
        match self
            .invoke("send", ticket, &[], Some(content))
            .await
            .map_err(MessengerError::SendFailed)?
        {
            HookStatus::Ok => Ok(()),
            HookStatus::Gone => Err(MessengerError::TicketGone(ticket.clone())),
            HookStatus::Failed(msg) => Err(MessengerError::SendFailed(msg)),
        }
    }

    async fn send_alert(
        &self,
        ticket: &TicketId,
        roles: &[String],
        content: &str,
    ) -> Result<(), MessengerError> {
        match self
            .invoke("alert", ticket, roles, Some(content))
            .await
            .map_err(MessengerError::SendFailed)?
        {
            HookStatus::Ok => Ok(()),
            HookStatus::Gone => Err(MessengerError::TicketGone(ticket.clone())),
            HookStatus::Failed(msg) => Err(MessengerError::SendFailed(msg)),
        }
    }

    async fn ticket_exists(&self, ticket: &TicketId) -> Result<bool, MessengerError> {
        match self
            .invoke("exists", ticket, &[], None)
            .await
            .map_err(MessengerError::LookupFailed)?
        {
            HookStatus::Ok => Ok(true),
            HookStatus::Gone => Ok(false),
            HookStatus::Failed(msg) => Err(MessengerError::LookupFailed(msg)),
        }
    }
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod tests;
