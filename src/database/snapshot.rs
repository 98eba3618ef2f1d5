// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Whole-database snapshot format.
//!
//! One file per database: a version byte, a CRC32 of the payload, then a
//! `bincode` encoding of every table. Not a stable on-disk format — it is
//! rewritten in full on every `save()` (`spec.md` §6) — but it has to
//! survive a crash mid-write, so `save` writes to a sibling temp file and
//! renames it into place, and `load` treats anything it can't trust
//! (missing file, empty file, bad CRC, undecodable payload) as an empty
//! database rather than an error, matching
//! `original_source/db_manager.py`'s `_load_database`.

use crate::error::{StoreError, StoreResult};
use crate::table::Table;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const FORMAT_VERSION: u8 = 1;

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub(crate) struct StoredDatabase {
    pub tables: HashMap<String, Table>,
}

/// Load a database snapshot from `path`. Never fails: a missing file, an
/// empty file, a CRC mismatch, or an undecodable payload all yield an empty
/// database, the latter two after printing a diagnostic to stderr.
pub(crate) fn load(path: &Path) -> StoredDatabase {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return StoredDatabase::default(),
    };
    if bytes.is_empty() {
        return StoredDatabase::default();
    }
    if bytes.len() < 5 {
        eprintln!(
            "bplusdb: snapshot '{}' is truncated ({} bytes); starting from an empty database",
            path.display(),
            bytes.len()
        );
        return StoredDatabase::default();
    }

    let _version = bytes[0];
    let stored_crc = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
    let payload = &bytes[5..];

    let actual_crc = crc32fast::hash(payload);
    if actual_crc != stored_crc {
        eprintln!(
            "bplusdb: snapshot '{}' failed checksum validation; starting from an empty database",
            path.display()
        );
        return StoredDatabase::default();
    }

    match bincode::deserialize::<StoredDatabase>(payload) {
        Ok(mut stored) => {
            for table in stored.tables.values_mut() {
                table.restore_transient_links();
            }
            stored
        }
        Err(err) => {
            eprintln!(
                "bplusdb: snapshot '{}' could not be decoded ({err}); starting from an empty database",
                path.display()
            );
            StoredDatabase::default()
        }
    }
}

/// Write `stored` to `path` atomically: serialize to a temp file in the same
/// directory, then rename over the destination. The rename is what makes a
/// single whole-file write atomic with respect to a crash mid-write; it is
/// not operation-log-based crash recovery (a Non-goal) — just the ordinary
/// way to make one `write()` call atomic.
pub(crate) fn save(path: &Path, stored: &StoredDatabase) -> StoreResult<()> {
    let payload = bincode::serialize(stored).map_err(|err| StoreError::SnapshotIoError {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    let crc = crc32fast::hash(&payload);

    let mut bytes = Vec::with_capacity(5 + payload.len());
    bytes.push(FORMAT_VERSION);
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes.extend_from_slice(&payload);

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("snapshot")
    ));

    fs::write(&tmp_path, &bytes).map_err(|e| StoreError::SnapshotIoError {
        path: tmp_path.display().to_string(),
        reason: e.to_string(),
    })?;
    fs::rename(&tmp_path, path).map_err(|e| StoreError::SnapshotIoError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
