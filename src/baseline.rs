// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Unordered linear-scan store, kept only as an out-of-core-scope collaborator
//! for A/B correctness and performance comparison against [`crate::Tree`].
//!
//! A direct port of `original_source/bruteforce.py`'s `BruteForceDB`: a flat
//! `Vec<(K, V)>`, linear `search`/`delete`/`update`, and a `range_query` that
//! filters and then sorts (the Python does the same — it is not meant to be
//! fast, only obviously correct).

#[derive(Debug, Clone, Default)]
pub struct LinearStore<K, V> {
    entries: Vec<(K, V)>,
}

impl<K: PartialEq + Ord + Clone, V: Clone> LinearStore<K, V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Upsert, same semantics as `Tree::insert`: linear scan for an existing
    /// key, overwrite in place, else push.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn search(&self, key: &K) -> Option<V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    pub fn update(&mut self, key: &K, value: V) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => {
                slot.1 = value;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, key: &K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }

    /// Filter then sort — unlike `Tree::range`, there is no ordering to
    /// exploit, so every call pays an O(n log n) sort.
    pub fn range(&self, lo: &K, hi: &K) -> Vec<(K, V)> {
        if lo > hi {
            return Vec::new();
        }
        let mut out: Vec<(K, V)> = self
            .entries
            .iter()
            .filter(|(k, _)| lo <= k && k <= hi)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn scan_all(&self) -> Vec<(K, V)> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn memory_estimate(&self) -> usize {
        std::mem::size_of::<Self>() + self.entries.capacity() * std::mem::size_of::<(K, V)>()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
