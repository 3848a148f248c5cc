// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine runtime

use crate::ExecuteError;
use nudge_storage::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("execute error: {0}")]
    Execute(#[from] ExecuteError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("store {op} timed out after {}ms", .timeout.as_millis())]
    StoreTimeout {
        op: &'static str,
        timeout: Duration,
    },
    #[error("invalid policy: {0}")]
    Policy(#[from] nudge_core::policy::PolicyError),
}
