// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tree vs. linear-scan baseline, across insert/search/range at a few
//! sizes — the same A/B axes as
//! `original_source/db_management_system/database/performance_utils.py`'s
//! `run_performance_benchmarks`.

use bplusdb::baseline::LinearStore;
use bplusdb::Tree;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const SIZES: [usize; 3] = [100, 1_000, 10_000];
const ORDER: u16 = 32;

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &size in &SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("tree", size), &size, |b, &size| {
            b.iter(|| {
                let mut tree: Tree<i64, i64> = Tree::new(ORDER).unwrap();
                for k in 0..size as i64 {
                    tree.insert(black_box(k), k);
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("baseline", size), &size, |b, &size| {
            b.iter(|| {
                let mut store: LinearStore<i64, i64> = LinearStore::new();
                for k in 0..size as i64 {
                    store.insert(black_box(k), k);
                }
            });
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    for &size in &SIZES {
        let mut tree: Tree<i64, i64> = Tree::new(ORDER).unwrap();
        let mut store: LinearStore<i64, i64> = LinearStore::new();
        for k in 0..size as i64 {
            tree.insert(k, k);
            store.insert(k, k);
        }
        let probe = size as i64 / 2;

        group.bench_with_input(BenchmarkId::new("tree", size), &size, |b, _| {
            b.iter(|| black_box(tree.search(&probe)));
        });
        group.bench_with_input(BenchmarkId::new("baseline", size), &size, |b, _| {
            b.iter(|| black_box(store.search(&probe)));
        });
    }
    group.finish();
}

fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");
    for &size in &SIZES {
        let mut tree: Tree<i64, i64> = Tree::new(ORDER).unwrap();
        let mut store: LinearStore<i64, i64> = LinearStore::new();
        for k in 0..size as i64 {
            tree.insert(k, k);
            store.insert(k, k);
        }
        let lo = size as i64 / 4;
        let hi = size as i64 / 4 + 100;

        group.bench_with_input(BenchmarkId::new("tree", size), &size, |b, _| {
            b.iter(|| black_box(tree.range(&lo, &hi)));
        });
        group.bench_with_input(BenchmarkId::new("baseline", size), &size, |b, _| {
            b.iter(|| black_box(store.range(&lo, &hi)));
        });
    }
    group.finish();
}

fn bench_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_estimate");
    for &size in &SIZES {
        let mut tree: Tree<i64, i64> = Tree::new(ORDER).unwrap();
        let mut store: LinearStore<i64, i64> = LinearStore::new();
        for k in 0..size as i64 {
            tree.insert(k, k);
            store.insert(k, k);
        }

        group.bench_with_input(BenchmarkId::new("tree", size), &size, |b, _| {
            b.iter(|| black_box(tree.memory_estimate()));
        });
        group.bench_with_input(BenchmarkId::new("baseline", size), &size, |b, _| {
            b.iter(|| black_box(store.memory_estimate()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_search, bench_range, bench_memory);
criterion_main!(benches);
