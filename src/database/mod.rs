// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! `Database`: a mapping from table name to [`Table`], persisted as one
//! snapshot file per database, plus directory-level helpers for managing
//! several databases in one folder.
//!
//! ## Architecture
//!
//! ```text
//! Database { path, tables: HashMap<String, Table> }
//!    │
//!    ├── create_table / delete_table / get_table / list_tables
//!    ├── save() ───────────► database::snapshot::save (CRC32 + atomic rename)
//!    └── open(path) ───────► database::snapshot::load (never fails)
//! ```
//!
//! Directory helpers (`list_databases`, `create_database`, `delete_database`)
//! are grounded directly in `original_source/db_manager.py`'s
//! `Database.list_databases` / `create_database` / `delete_database`
//! `@staticmethod`s, with a `.db` file extension in place of `.pkl`.

mod snapshot;

use crate::error::{StoreError, StoreResult};
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::table::Table;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const DB_EXTENSION: &str = "db";

/// A collection of named tables, persisted as a single snapshot file.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    tables: HashMap<String, Table>,
}

/// Row count and memory footprint for one table, as reported by `stats()`.
#[derive(Debug, Clone)]
pub struct TableStats {
    pub name: String,
    pub order: u16,
    pub row_count: usize,
    pub memory_estimate: usize,
}

/// Everything `Database::stats()` reports: per-table sizes plus the global
/// operation counters.
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub tables: Vec<TableStats>,
    pub metrics: MetricsSnapshot,
}

impl Database {
    /// Open the snapshot at `path`. Never fails: a missing, empty, or
    /// corrupted file all yield an empty database (`spec.md` §6).
    pub fn open(path: impl AsRef<Path>) -> Self {
        let stored = snapshot::load(path.as_ref());
        Self {
            path: path.as_ref().to_path_buf(),
            tables: stored.tables,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn create_table(&mut self, name: &str, order: u16) -> StoreResult<()> {
        if self.tables.contains_key(name) {
            return Err(StoreError::TableExists { name: name.to_string() });
        }
        self.tables.insert(name.to_string(), Table::new(name, order)?);
        Ok(())
    }

    pub fn delete_table(&mut self, name: &str) -> bool {
        self.tables.remove(name).is_some()
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Write the whole database to `self.path`, atomically.
    pub fn save(&self) -> StoreResult<()> {
        let stored = snapshot::StoredDatabase {
            tables: self.tables.clone(),
        };
        snapshot::save(&self.path, &stored)?;

        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        MetricsCollector::global().record_save(now_millis);
        Ok(())
    }

    /// Per-table row counts and memory estimates, plus the global operation
    /// counters — backs the CLI `stats` command.
    pub fn stats(&self) -> DatabaseStats {
        let mut tables: Vec<TableStats> = self
            .tables
            .values()
            .map(|t| TableStats {
                name: t.name().to_string(),
                order: t.order(),
                row_count: t.scan_all().len(),
                memory_estimate: t.memory_estimate(),
            })
            .collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));

        DatabaseStats {
            tables,
            metrics: MetricsCollector::global().snapshot(),
        }
    }
}

fn db_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{DB_EXTENSION}"))
}

/// Every database file (by name, extension stripped) in `dir`.
pub fn list_databases(dir: impl AsRef<Path>) -> StoreResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(DB_EXTENSION) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Create a new, empty database file in `dir`. Fails if one already exists
/// for `name`, matching `original_source/db_manager.py`'s
/// `create_database`.
pub fn create_database(name: &str, dir: impl AsRef<Path>) -> StoreResult<Database> {
    let path = db_path(dir.as_ref(), name);
    if path.exists() {
        return Err(StoreError::DatabaseExists { name: name.to_string() });
    }
    fs::create_dir_all(dir.as_ref())?;

    let db = Database { path, tables: HashMap::new() };
    db.save()?;
    Ok(db)
}

/// Open an existing database by name. Fails if no file exists for `name` —
/// unlike `Database::open`, which is handed a path directly and treats a
/// missing file as "start empty", this directory-level helper distinguishes
/// "no such database" from "empty database" the way
/// `db_manager.py`'s `get_database` does.
pub fn get_database(name: &str, dir: impl AsRef<Path>) -> StoreResult<Database> {
    let path = db_path(dir.as_ref(), name);
    if !path.exists() {
        return Err(StoreError::DatabaseMissing { name: name.to_string() });
    }
    Ok(Database::open(path))
}

/// Remove a database's file. Returns whether it existed.
pub fn delete_database(name: &str, dir: impl AsRef<Path>) -> StoreResult<bool> {
    let path = db_path(dir.as_ref(), name);
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(&path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn create_table_rejects_duplicate_names() {
        let mut db = Database::open("/nonexistent/path/should/not/be/read.db");
        db.create_table("t", 4).unwrap();
        assert!(matches!(db.create_table("t", 4), Err(StoreError::TableExists { .. })));
    }

    #[test]
    fn snapshot_durability_scenario_6() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scenario6.db");

        let mut db = Database::open(&path);
        db.create_table("t", 4).unwrap();
        {
            let table = db.get_table_mut("t").unwrap();
            for k in 0..100i64 {
                table.insert(Key::Int(k), json!(k * 7));
            }
        }
        db.save().unwrap();

        let reopened = Database::open(&path);
        let original = db.get_table("t").unwrap().scan_all();
        let restored = reopened.get_table("t").unwrap().scan_all();
        assert_eq!(original, restored);
    }

    #[test]
    fn directory_helpers_create_list_delete() {
        let dir = tempdir().unwrap();

        create_database("alpha", dir.path()).unwrap();
        create_database("beta", dir.path()).unwrap();
        assert!(matches!(
            create_database("alpha", dir.path()),
            Err(StoreError::DatabaseExists { .. })
        ));

        let mut names = list_databases(dir.path()).unwrap();
        names.sort();
        assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);

        assert!(get_database("alpha", dir.path()).is_ok());
        assert!(matches!(
            get_database("gamma", dir.path()),
            Err(StoreError::DatabaseMissing { .. })
        ));

        assert!(delete_database("alpha", dir.path()).unwrap());
        assert!(!delete_database("alpha", dir.path()).unwrap());
        assert_eq!(list_databases(dir.path()).unwrap(), vec!["beta".to_string()]);
    }
}
