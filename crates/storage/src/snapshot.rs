// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time copies of the ticket table.
//!
//! A snapshot records the WAL sequence it covers. Startup loads it and
//! replays only the WAL entries written after that sequence.

use crate::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Snapshot format version written by this build
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Last WAL sequence folded into `state`
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    CURRENT_SNAPSHOT_VERSION
}

impl Snapshot {
    pub fn new(seq: u64, state: MaterializedState) -> Self {
        Self {
            version: CURRENT_SNAPSHOT_VERSION,
            seq,
            state,
            created_at: Utc::now(),
        }
    }

    /// Write to `<path>.tmp`, fsync, rename over `path`, then fsync the
    /// directory so the rename itself is durable before the WAL is truncated.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, self)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }

        fs::rename(&tmp_path, path)?;

        if let Some(parent) = path.parent() {
            File::open(parent)?.sync_all()?;
        }
        Ok(())
    }

    /// Load the snapshot at `path`.
    ///
    /// Missing file gives `Ok(None)`. An unparseable file is moved to `.bak`
    /// and also gives `Ok(None)` so startup falls back to WAL replay. A file
    /// written by a newer build is an error and is left in place.
    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        if !path.exists() {
            return Ok(None);
        }

        let reader = BufReader::new(File::open(path)?);
        match serde_json::from_reader::<_, Snapshot>(reader) {
            Ok(snapshot) if snapshot.version > CURRENT_SNAPSHOT_VERSION => {
                Err(SnapshotError::UnsupportedVersion {
                    found: snapshot.version,
                    supported: CURRENT_SNAPSHOT_VERSION,
                })
            }
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                let bak_path = rotate_bak_path(path);
                warn!(
                    error = %e,
                    path = %path.display(),
                    bak = %bak_path.display(),
                    "corrupt snapshot, moving to .bak and replaying WAL",
                );
                fs::rename(path, &bak_path)?;
                Ok(None)
            }
        }
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Next free backup path for `path`: `.bak`, then `.bak.2`, `.bak.3`.
///
/// Existing backups shift up by one and the oldest beyond [`MAX_BAK_FILES`]
/// is removed.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| match n {
        1 => path.with_extension("bak"),
        n => path.with_extension(format!("bak.{n}")),
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
