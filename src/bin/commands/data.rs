// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Record-level commands: insert, update, delete, get, range, rebuild,
//! render. Every mutating command saves the database on success, matching
//! `spec.md` §6's "persists after each mutation by calling save()".

use anyhow::{bail, Context, Result};
use bplusdb::{Database, Key};
use std::path::{Path, PathBuf};

fn open_table_mut<'a>(db: &'a mut Database, table: &str) -> Result<&'a mut bplusdb::Table> {
    db.get_table_mut(table)
        .with_context(|| format!("table '{table}' not found"))
}

pub fn insert(path: &Path, table: &str, key: &str, value_json: &str) -> Result<()> {
    let mut db = Database::open(path);
    let value: serde_json::Value =
        serde_json::from_str(value_json).with_context(|| format!("'{value_json}' is not valid JSON"))?;
    open_table_mut(&mut db, table)?.insert(Key::parse(key), value);
    db.save().with_context(|| format!("failed to save database at {}", path.display()))?;
    println!("OK");
    Ok(())
}

pub fn update(path: &Path, table: &str, key: &str, value_json: &str) -> Result<()> {
    let mut db = Database::open(path);
    let value: serde_json::Value =
        serde_json::from_str(value_json).with_context(|| format!("'{value_json}' is not valid JSON"))?;
    let updated = open_table_mut(&mut db, table)?.update(&Key::parse(key), value);
    if !updated {
        println!("No such key: {key}");
        return Ok(());
    }
    db.save().with_context(|| format!("failed to save database at {}", path.display()))?;
    println!("OK");
    Ok(())
}

pub fn delete(path: &Path, table: &str, key: &str) -> Result<()> {
    let mut db = Database::open(path);
    let deleted = open_table_mut(&mut db, table)?.delete(&Key::parse(key));
    if !deleted {
        println!("No such key: {key}");
        return Ok(());
    }
    db.save().with_context(|| format!("failed to save database at {}", path.display()))?;
    println!("OK");
    Ok(())
}

pub fn get(path: &Path, table: &str, key: &str) -> Result<()> {
    let db = Database::open(path);
    let table = db.get_table(table).with_context(|| format!("table '{table}' not found"))?;
    match table.search(&Key::parse(key)) {
        Some(value) => println!("{value}"),
        None => println!("null"),
    }
    Ok(())
}

pub fn range(path: &Path, table: &str, lo: &str, hi: &str) -> Result<()> {
    let db = Database::open(path);
    let table = db.get_table(table).with_context(|| format!("table '{table}' not found"))?;
    for (key, value) in table.range(&Key::parse(lo), &Key::parse(hi)) {
        println!("{key}\t{value}");
    }
    Ok(())
}

pub fn rebuild(path: &Path, table: &str, order: u16) -> Result<()> {
    let mut db = Database::open(path);
    open_table_mut(&mut db, table)?
        .rebuild(order)
        .with_context(|| format!("failed to rebuild table '{table}' at order {order}"))?;
    db.save().with_context(|| format!("failed to save database at {}", path.display()))?;
    println!("Rebuilt table '{table}' at order {order}");
    Ok(())
}

pub fn render(path: &Path, table: &str, out: &PathBuf) -> Result<()> {
    let db = Database::open(path);
    let table_ref = db.get_table(table);
    let Some(table_ref) = table_ref else {
        bail!("table '{table}' not found");
    };
    table_ref
        .render_to(out)
        .with_context(|| format!("failed to render table '{table}' to {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}
