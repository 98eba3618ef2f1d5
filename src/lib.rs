// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! An in-memory, snapshot-persisted, ordered key-value storage engine.
//!
//! Tables are independent B+ tree indexes keyed on a totally-ordered
//! primary key, grouped under a [`Database`] that persists all of them to a
//! single file on demand.
//!
//! ## Modules
//!
//! - [`node`] — the arena-indexed node representation (leaf/internal) and
//!   its structural predicates.
//! - [`tree`] — the B+ tree itself: lookup, insert, delete, split,
//!   rebalance, range scan.
//! - [`key`] — the concrete `Key`/`Value` pair used above the generic core.
//! - [`table`] — a name bound to a tree.
//! - [`database`] — a map of tables persisted as one snapshot file, plus
//!   directory-level database management.
//! - [`baseline`] — an unordered linear-scan store kept only for A/B
//!   comparison against the tree.
//! - [`metrics`] — process-wide operation counters.
//! - [`error`] — the crate-wide error type.
//!
//! ## Example
//!
//! ```
//! use bplusdb::{Database, Key};
//! use serde_json::json;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let path = dir.path().join("example.db");
//!
//! let mut db = Database::open(&path);
//! db.create_table("people", 4).unwrap();
//! db.get_table_mut("people").unwrap().insert(Key::Int(1), json!({"name": "Ada"}));
//! db.save().unwrap();
//!
//! let reopened = Database::open(&path);
//! assert_eq!(
//!     reopened.get_table("people").unwrap().search(&Key::Int(1)),
//!     Some(json!({"name": "Ada"})),
//! );
//! ```

pub mod baseline;
pub mod database;
pub mod error;
pub mod key;
pub mod metrics;
pub mod node;
pub mod table;
pub mod tree;

pub use database::Database;
pub use error::{StoreError, StoreResult};
pub use key::{Key, Value};
pub use table::Table;
pub use tree::Tree;
