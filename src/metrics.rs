// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Global operation counters.
//!
//! Not an observability stack — no export format, no percentiles, no
//! background flush thread. Just the process-wide counts a `stats` command
//! wants, kept in the same `once_cell::sync::Lazy` singleton shape as the
//! teacher's `MetricsCollector::global()`, scaled down to what this crate
//! actually needs: an atomic counter per operation kind and a last-save
//! timestamp.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

static COLLECTOR: Lazy<MetricsCollector> = Lazy::new(MetricsCollector::new);

/// Process-wide counters for the core operations, plus the time of the most
/// recent successful snapshot save.
pub struct MetricsCollector {
    inserts: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    searches: AtomicU64,
    ranges: AtomicU64,
    last_save_unix_millis: AtomicI64,
}

impl MetricsCollector {
    fn new() -> Self {
        Self {
            inserts: AtomicU64::new(0),
            updates: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            searches: AtomicU64::new(0),
            ranges: AtomicU64::new(0),
            last_save_unix_millis: AtomicI64::new(0),
        }
    }

    /// Returns the global singleton instance.
    pub fn global() -> &'static Self {
        &COLLECTOR
    }

    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_search(&self) {
        self.searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_range(&self) {
        self.ranges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save(&self, unix_millis: i64) {
        self.last_save_unix_millis.store(unix_millis, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            ranges: self.ranges.load(Ordering::Relaxed),
            last_save_unix_millis: self.last_save_unix_millis.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    fn reset(&self) {
        self.inserts.store(0, Ordering::Relaxed);
        self.updates.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
        self.searches.store(0, Ordering::Relaxed);
        self.ranges.store(0, Ordering::Relaxed);
        self.last_save_unix_millis.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time read of the global counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub searches: u64,
    pub ranges: u64,
    pub last_save_unix_millis: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn counters_start_at_zero_and_accumulate() {
        MetricsCollector::global().reset();
        MetricsCollector::global().record_insert();
        MetricsCollector::global().record_insert();
        MetricsCollector::global().record_delete();

        let snap = MetricsCollector::global().snapshot();
        assert_eq!(snap.inserts, 2);
        assert_eq!(snap.deletes, 1);
        assert_eq!(snap.updates, 0);
    }

    #[test]
    #[serial]
    fn record_save_updates_timestamp() {
        MetricsCollector::global().reset();
        MetricsCollector::global().record_save(12345);
        assert_eq!(MetricsCollector::global().snapshot().last_save_unix_millis, 12345);
    }
}
