//! Restarts over the on-disk store

use crate::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn paths(dir: &TempDir) -> (PathBuf, PathBuf) {
    (
        dir.path().join("wal").join("tickets.wal"),
        dir.path().join("snapshot.json"),
    )
}

fn open(wal: &Path, snapshot: &Path) -> WalStore {
    WalStore::open(wal, snapshot).unwrap()
}

#[tokio::test]
async fn countdown_survives_reopening_the_store() {
    let dir = tempdir().unwrap();
    let (wal, snapshot) = paths(&dir);
    let daemon = Daemon::with_store(open(&wal, &snapshot));
    daemon.open_and_wait_on_requester(TICKET).await;
    daemon.advance(7 * HOUR).await;

    let (daemon, summary) = daemon
        .restart_with_store(HOUR, |old| {
            drop(old);
            open(&wal, &snapshot)
        })
        .await;

    assert_eq!(summary.resumed, 1);
    let record = daemon
        .store
        .get(&TicketId::new(TICKET))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.reminder_count, 1);

    daemon.advance(4 * HOUR).await;
    assert_eq!(daemon.reminders(TICKET).len(), 2);
}

#[tokio::test]
async fn checkpointed_and_logged_changes_both_recover() {
    let dir = tempdir().unwrap();
    let (wal, snapshot) = paths(&dir);
    let daemon = Daemon::with_store(open(&wal, &snapshot));
    daemon.open_and_wait_on_requester("t-a").await;
    daemon.store.checkpoint().await.unwrap();
    daemon.open_and_wait_on_requester("t-b").await;
    daemon.command("t-a", TicketCommand::TimerStop).await;

    let (daemon, summary) = daemon
        .restart_with_store(MINUTE, |old| {
            drop(old);
            open(&wal, &snapshot)
        })
        .await;

    assert_eq!(summary.resumed, 1);
    assert_eq!(summary.idle, 1);
    assert_eq!(daemon.state("t-a").await, TicketState::Idle);
    assert_eq!(daemon.state("t-b").await, TicketState::Active);
}
