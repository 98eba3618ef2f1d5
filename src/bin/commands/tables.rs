// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Table lifecycle commands: create, drop, list.

use anyhow::{Context, Result};
use bplusdb::Database;
use std::path::Path;

pub fn create(path: &Path, name: &str, order: u16) -> Result<()> {
    let mut db = Database::open(path);
    db.create_table(name, order)
        .with_context(|| format!("failed to create table '{name}'"))?;
    db.save().with_context(|| format!("failed to save database at {}", path.display()))?;
    println!("Created table '{name}' (order {order})");
    Ok(())
}

pub fn drop(path: &Path, name: &str) -> Result<()> {
    let mut db = Database::open(path);
    if !db.delete_table(name) {
        eprintln!("Table '{name}' does not exist");
        return Ok(());
    }
    db.save().with_context(|| format!("failed to save database at {}", path.display()))?;
    println!("Dropped table '{name}'");
    Ok(())
}

pub fn list(path: &Path) -> Result<()> {
    let db = Database::open(path);
    let tables = db.list_tables();

    if tables.is_empty() {
        println!("No tables found");
        return Ok(());
    }

    println!("Tables:");
    for name in tables {
        println!("  - {name}");
    }
    Ok(())
}
