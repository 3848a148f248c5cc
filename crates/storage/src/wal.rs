// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL write-ahead log of ticket store operations.
//!
//! Every append is written and fsynced before it returns, so an operation
//! the caller saw succeed survives a crash. Recovery loads the snapshot and
//! replays entries after the snapshot's sequence number.
//!
//! Each entry is a single line of JSON: `{"seq":N,"op":{...}}\n`

use crate::state::StoreOp;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur in Wal operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialization helper for writing entries without cloning the op.
#[derive(Serialize)]
struct WalRecordRef<'a> {
    seq: u64,
    op: &'a StoreOp,
}

#[derive(Deserialize)]
struct WalRecord {
    seq: u64,
    op: StoreOp,
}

/// A single WAL entry with sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    pub seq: u64,
    pub op: StoreOp,
}

/// Lines read from the log up to the first unparseable one
struct Scan {
    entries: Vec<(WalEntry, String)>,
    corrupt: bool,
}

pub struct Wal {
    file: File,
    path: PathBuf,
    /// Sequence number of the last appended entry
    write_seq: u64,
}

impl Wal {
    /// Open or create a WAL at the given path.
    ///
    /// `base_seq` is the sequence number covered by the snapshot; new entries
    /// are numbered after it even when the log itself is empty. A corrupt tail
    /// is moved aside to a `.bak` file and the valid prefix is kept.
    pub fn open(path: &Path, base_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = open_append(path)?;
        let scan = scan_log(&file)?;

        if scan.corrupt {
            drop(file);

            let bak_path = crate::snapshot::rotate_bak_path(path);
            warn!(
                path = %path.display(),
                bak = %bak_path.display(),
                valid_entries = scan.entries.len(),
                "corrupt WAL detected, rotating to .bak and keeping valid entries",
            );
            std::fs::rename(path, &bak_path)?;

            {
                let mut clean = File::create(path)?;
                for (_, line) in &scan.entries {
                    clean.write_all(line.as_bytes())?;
                    clean.write_all(b"\n")?;
                }
                clean.sync_all()?;
            }

            file = open_append(path)?;
        }

        let max_seq = scan
            .entries
            .iter()
            .map(|(entry, _)| entry.seq)
            .max()
            .unwrap_or(0);

        Ok(Self {
            file,
            path: path.to_owned(),
            write_seq: max_seq.max(base_seq),
        })
    }

    /// Append an operation and fsync. Returns the assigned sequence number.
    pub fn append(&mut self, op: &StoreOp) -> Result<u64, WalError> {
        let seq = self.write_seq + 1;
        let mut json_bytes = serde_json::to_vec(&WalRecordRef { seq, op })?;
        json_bytes.push(b'\n');
        self.file.write_all(&json_bytes)?;
        self.file.sync_all()?;
        self.write_seq = seq;
        Ok(seq)
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    /// All entries with a sequence number greater than `seq`.
    pub fn entries_after(&self, seq: u64) -> Result<Vec<WalEntry>, WalError> {
        let scan = scan_log(&self.file)?;
        if scan.corrupt {
            warn!(path = %self.path.display(), "corrupt WAL entry during replay, stopping at corruption point");
        }
        Ok(scan
            .entries
            .into_iter()
            .map(|(entry, _)| entry)
            .filter(|entry| entry.seq > seq)
            .collect())
    }

    /// Drop entries with a sequence number below `seq`.
    ///
    /// Called after a checkpoint made those entries redundant. The kept
    /// entries are written to a temp file which then replaces the log.
    pub fn truncate_before(&mut self, seq: u64) -> Result<(), WalError> {
        let kept: Vec<String> = scan_log(&self.file)?
            .entries
            .into_iter()
            .filter(|(entry, _)| entry.seq >= seq)
            .map(|(_, line)| line)
            .collect();

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut tmp_file = File::create(&tmp_path)?;
            for line in &kept {
                tmp_file.write_all(line.as_bytes())?;
                tmp_file.write_all(b"\n")?;
            }
            tmp_file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        self.file = open_append(&self.path)?;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
}

/// Read entries from the start of the log, stopping at the first bad line.
fn scan_log(file: &File) -> Result<Scan, WalError> {
    let mut reader = BufReader::new(file.try_clone()?);
    reader.seek(SeekFrom::Start(0))?;

    let mut entries = Vec::new();
    let mut corrupt = false;
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                corrupt = true;
                break;
            }
            Err(e) => return Err(e.into()),
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<WalRecord>(trimmed) {
            Ok(record) => entries.push((
                WalEntry {
                    seq: record.seq,
                    op: record.op,
                },
                trimmed.to_string(),
            )),
            Err(_) => {
                corrupt = true;
                break;
            }
        }
    }

    Ok(Scan { entries, corrupt })
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
