// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake messenger for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Messenger, MessengerError};
use async_trait::async_trait;
use nudge_core::TicketId;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Recorded delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessengerCall {
    Message {
        ticket: TicketId,
        content: String,
    },
    Alert {
        ticket: TicketId,
        roles: Vec<String>,
        content: String,
    },
}

impl MessengerCall {
    pub fn ticket(&self) -> &TicketId {
        match self {
            MessengerCall::Message { ticket, .. } | MessengerCall::Alert { ticket, .. } => ticket,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            MessengerCall::Message { content, .. } | MessengerCall::Alert { content, .. } => {
                content
            }
        }
    }
}

#[derive(Default)]
struct FakeMessengerState {
    calls: Vec<MessengerCall>,
    gone: HashSet<TicketId>,
    fail_sends: bool,
    fail_lookups: bool,
    failed_sends: usize,
    on_lookup: Option<Arc<dyn Fn() + Send + Sync>>,
}

/// Fake messenger that records successful deliveries.
///
/// Failed sends are counted but not recorded as calls.
#[derive(Clone, Default)]
pub struct FakeMessenger {
    inner: Arc<Mutex<FakeMessengerState>>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded deliveries
    pub fn calls(&self) -> Vec<MessengerCall> {
        self.inner.lock().calls.clone()
    }

    /// Reminder bodies delivered to `ticket`, in order
    pub fn messages(&self, ticket: &str) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MessengerCall::Message { ticket: t, content } if t.as_str() == ticket => {
                    Some(content.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Alert bodies delivered to `ticket`, in order
    pub fn alerts(&self, ticket: &str) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MessengerCall::Alert {
                    ticket: t, content, ..
                } if t.as_str() == ticket => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.inner.lock().calls.clear();
    }

    /// Make every subsequent send fail
    pub fn set_fail_sends(&self, fail: bool) {
        self.inner.lock().fail_sends = fail;
    }

    /// Make `ticket_exists` fail
    pub fn set_fail_lookups(&self, fail: bool) {
        self.inner.lock().fail_lookups = fail;
    }

    /// Run `hook` inside every `ticket_exists`, before it answers
    pub fn set_on_lookup(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.inner.lock().on_lookup = Some(Arc::new(hook));
    }

    pub fn failed_sends(&self) -> usize {
        self.inner.lock().failed_sends
    }

    /// Simulate the ticket's channel being deleted
    pub fn mark_gone(&self, ticket: &str) {
        self.inner.lock().gone.insert(TicketId::new(ticket));
    }

    fn deliver(&self, call: MessengerCall) -> Result<(), MessengerError> {
        let mut state = self.inner.lock();
        if state.gone.contains(call.ticket()) {
            state.failed_sends += 1;
            return Err(MessengerError::TicketGone(call.ticket().clone()));
        }
        if state.fail_sends {
            state.failed_sends += 1;
            return Err(MessengerError::SendFailed("injected failure".into()));
        }
        state.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send_message(&self, ticket: &TicketId, content: &str) -> Result<(), MessengerError> {
        self.deliver(MessengerCall::Message {
            ticket: ticket.clone(),
            content: content.to_string(),
        })
    }

    async fn send_alert(
        &self,
        ticket: &TicketId,
        roles: &[String],
        content: &str,
    ) -> Result<(), MessengerError> {
        self.deliver(MessengerCall::Alert {
            ticket: ticket.clone(),
            roles: roles.to_vec(),
            content: content.to_string(),
        })
    }

    async fn ticket_exists(&self, ticket: &TicketId) -> Result<bool, MessengerError> {
        let hook = self.inner.lock().on_lookup.clone();
        if let Some(hook) = hook {
            hook();
        }
        let state = self.inner.lock();
        if state.fail_lookups {
            return Err(MessengerError::LookupFailed("injected failure".into()));
        }
        Ok(!state.gone.contains(ticket))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
