// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::StoreOp;
use nudge_core::test_support::running_record;
use nudge_core::TicketId;
use std::io::Write;
use tempfile::tempdir;

fn state_with_one_ticket() -> MaterializedState {
    let mut state = MaterializedState::default();
    state.apply(&StoreOp::Upsert {
        record: running_record("t-1", "u-1", 10_000, 2),
    });
    state
}

#[test]
fn save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    Snapshot::new(42, state_with_one_ticket()).save(&path).unwrap();
    assert!(!path.with_extension("tmp").exists());

    let loaded = Snapshot::load(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 42);
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
    let record = loaded.state.get(&TicketId::new("t-1")).unwrap();
    assert_eq!(record.reminder_count, 2);
}

#[test]
fn missing_file_loads_as_none() {
    let dir = tempdir().unwrap();
    assert!(Snapshot::load(&dir.path().join("nope.json"))
        .unwrap()
        .is_none());
}

#[test]
fn corrupt_snapshot_is_moved_aside() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    File::create(&path)
        .unwrap()
        .write_all(b"{not json")
        .unwrap();

    assert!(Snapshot::load(&path).unwrap().is_none());
    assert!(!path.exists());
    assert!(path.with_extension("bak").exists());
}

#[test]
fn newer_version_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let mut snapshot = Snapshot::new(1, MaterializedState::default());
    snapshot.version = CURRENT_SNAPSHOT_VERSION + 1;
    snapshot.save(&path).unwrap();

    let err = Snapshot::load(&path).unwrap_err();
    assert!(matches!(err, SnapshotError::UnsupportedVersion { .. }));
    assert!(path.exists());
}

#[test]
fn bak_rotation_keeps_three_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    for i in 0..4 {
        File::create(&path)
            .unwrap()
            .write_all(format!("corrupt {i}").as_bytes())
            .unwrap();
        assert!(Snapshot::load(&path).unwrap().is_none());
    }

    assert!(path.with_extension("bak").exists());
    assert!(path.with_extension("bak.2").exists());
    assert!(path.with_extension("bak.3").exists());
    assert!(!path.with_extension("bak.4").exists());
    let newest = std::fs::read_to_string(path.with_extension("bak")).unwrap();
    assert_eq!(newest, "corrupt 3");
}
