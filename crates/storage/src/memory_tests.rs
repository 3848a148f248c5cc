// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use nudge_core::test_support::idle_record;

#[tokio::test]
async fn clones_share_the_table() {
    let store = MemoryStore::new();
    let other = store.clone();
    store.upsert(&idle_record("t-1", "u-1")).await.unwrap();
    assert_eq!(other.count().await.unwrap(), 1);
    assert_eq!(other.ops().len(), 1);
}

#[tokio::test]
async fn injected_failure_leaves_table_untouched() {
    let store = MemoryStore::with_records([idle_record("t-1", "u-1")]);
    store.set_fail_writes(true);

    let err = store.delete(&TicketId::new("t-1")).await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(store.record("t-1").is_some());
    assert!(store.ops().is_empty());

    store.set_fail_writes(false);
    assert!(store.delete(&TicketId::new("t-1")).await.unwrap());
    assert!(store.record("t-1").is_none());
}
