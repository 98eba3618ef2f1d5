// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Stats command: per-table row counts and memory estimates, plus the
//! global operation counters.

use anyhow::Result;
use bplusdb::Database;
use chrono::{Local, TimeZone};
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let db = Database::open(path);
    let stats = db.stats();

    if stats.tables.is_empty() {
        println!("No tables found");
    } else {
        println!("Tables:");
        for table in &stats.tables {
            println!(
                "  - {:<20} order={:<4} rows={:<8} ~{} bytes",
                table.name, table.order, table.row_count, table.memory_estimate
            );
        }
    }

    println!("\nOperation counters:");
    println!("  inserts: {}", stats.metrics.inserts);
    println!("  updates: {}", stats.metrics.updates);
    println!("  deletes: {}", stats.metrics.deletes);
    println!("  searches: {}", stats.metrics.searches);
    println!("  ranges: {}", stats.metrics.ranges);
    println!("  last save: {}", format_last_save(stats.metrics.last_save_unix_millis));

    Ok(())
}

fn format_last_save(unix_millis: i64) -> String {
    if unix_millis == 0 {
        return "never".to_string();
    }
    match Local.timestamp_millis_opt(unix_millis) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => format!("{unix_millis} (unix ms)"),
    }
}
