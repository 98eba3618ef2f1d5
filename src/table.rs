// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! A named table: a thin binding of a name to a [`Tree`], concretized over
//! [`Key`]/[`Value`]. Forwards every `Tree` operation and records a counter
//! on each one, mirroring `original_source/table.py`'s `Table` (which logs a
//! line on every insert/select/delete/update/range_query call).

use crate::error::StoreResult;
use crate::key::{Key, Value};
use crate::metrics::MetricsCollector;
use crate::tree::Tree;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    name: String,
    tree: Tree<Key, Value>,
}

impl Table {
    pub fn new(name: impl Into<String>, order: u16) -> StoreResult<Self> {
        Ok(Self {
            name: name.into(),
            tree: Tree::new(order)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> u16 {
        self.tree.order()
    }

    pub fn search(&self, key: &Key) -> Option<Value> {
        MetricsCollector::global().record_search();
        self.tree.search(key)
    }

    pub fn insert(&mut self, key: Key, value: Value) {
        MetricsCollector::global().record_insert();
        self.tree.insert(key, value);
    }

    pub fn update(&mut self, key: &Key, value: Value) -> bool {
        MetricsCollector::global().record_update();
        self.tree.update(key, value)
    }

    pub fn delete(&mut self, key: &Key) -> bool {
        MetricsCollector::global().record_delete();
        self.tree.delete(key)
    }

    pub fn range(&self, lo: &Key, hi: &Key) -> Vec<(Key, Value)> {
        MetricsCollector::global().record_range();
        self.tree.range(lo, hi)
    }

    pub fn scan_all(&self) -> Vec<(Key, Value)> {
        self.tree.scan_all()
    }

    pub fn memory_estimate(&self) -> usize {
        self.tree.memory_estimate()
    }

    pub fn render_to<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        self.tree.render_to(path)
    }

    /// Rebuild this table's index at a new order, replacing its tree with
    /// the rebuilt one — `spec.md` §6's "Rebuild with new order", exposed at
    /// table granularity.
    pub fn rebuild(&mut self, new_order: u16) -> StoreResult<()> {
        self.tree = self.tree.rebuild(new_order)?;
        Ok(())
    }

    pub(crate) fn restore_transient_links(&mut self) {
        self.tree.restore_transient_links();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forwards_tree_operations() {
        let mut table = Table::new("people", 4).unwrap();
        table.insert(Key::Int(1), json!({"name": "Ada"}));
        assert_eq!(table.search(&Key::Int(1)), Some(json!({"name": "Ada"})));
        assert!(table.update(&Key::Int(1), json!({"name": "Ada L."})));
        assert!(!table.update(&Key::Int(2), json!(null)));
        assert!(table.delete(&Key::Int(1)));
        assert!(!table.delete(&Key::Int(1)));
    }

    #[test]
    fn rebuild_changes_order_but_not_contents() {
        let mut table = Table::new("t", 4).unwrap();
        for k in 0..20 {
            table.insert(Key::Int(k), json!(k));
        }
        let before = table.scan_all();
        table.rebuild(8).unwrap();
        assert_eq!(table.order(), 8);
        assert_eq!(table.scan_all(), before);
    }
}
