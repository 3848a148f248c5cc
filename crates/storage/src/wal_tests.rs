// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use nudge_core::test_support::{idle_record, running_record};
use nudge_core::TicketId;
use std::io::Write;
use tempfile::tempdir;

fn upsert(ticket: &str) -> StoreOp {
    StoreOp::Upsert {
        record: idle_record(ticket, "u-1"),
    }
}

#[test]
fn append_assigns_increasing_sequence_numbers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal/tickets.wal");
    let mut wal = Wal::open(&path, 0).unwrap();

    assert_eq!(wal.append(&upsert("a")).unwrap(), 1);
    assert_eq!(wal.append(&upsert("b")).unwrap(), 2);
    assert_eq!(wal.write_seq(), 2);
    assert!(path.exists());
}

#[test]
fn entries_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tickets.wal");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&upsert("a")).unwrap();
        wal.append(&StoreOp::Delete {
            id: TicketId::new("a"),
        })
        .unwrap();
    }

    let wal = Wal::open(&path, 0).unwrap();
    assert_eq!(wal.write_seq(), 2);
    let entries = wal.entries_after(0).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].seq, 2);
    assert!(matches!(entries[1].op, StoreOp::Delete { .. }));
}

#[test]
fn entries_after_skips_snapshotted_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tickets.wal");
    let mut wal = Wal::open(&path, 0).unwrap();
    for id in ["a", "b", "c"] {
        wal.append(&upsert(id)).unwrap();
    }

    let seqs: Vec<_> = wal.entries_after(1).unwrap().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![2, 3]);
}

#[test]
fn base_seq_continues_numbering_after_empty_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tickets.wal");
    let mut wal = Wal::open(&path, 40).unwrap();
    assert_eq!(wal.append(&upsert("a")).unwrap(), 41);
}

#[test]
fn truncate_before_keeps_later_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tickets.wal");
    let mut wal = Wal::open(&path, 0).unwrap();
    for id in ["a", "b", "c"] {
        wal.append(&upsert(id)).unwrap();
    }

    wal.truncate_before(3).unwrap();
    let seqs: Vec<_> = wal.entries_after(0).unwrap().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![3]);

    // Appends continue after truncation
    assert_eq!(wal.append(&upsert("d")).unwrap(), 4);
    assert_eq!(wal.entries_after(0).unwrap().len(), 2);
}

#[test]
fn corrupt_tail_is_rotated_and_valid_prefix_kept() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tickets.wal");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&StoreOp::Upsert {
            record: running_record("a", "u-1", 5_000, 1),
        })
        .unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"seq\":2,\"op\":{\"type\":\"tick\n").unwrap();
    }

    let wal = Wal::open(&path, 0).unwrap();
    assert!(path.with_extension("bak").exists());
    assert_eq!(wal.write_seq(), 1);
    let entries = wal.entries_after(0).unwrap();
    assert_eq!(entries.len(), 1);
    match &entries[0].op {
        StoreOp::Upsert { record } => assert_eq!(record.reminder_count, 1),
        other => panic!("unexpected op: {other:?}"),
    }
}
