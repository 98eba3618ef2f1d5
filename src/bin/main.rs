// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Command-line front-end over the storage engine.
//!
//! Parses a key numeric-if-parseable-else-text, reads a value as a JSON
//! argument, dispatches to the library's `Database`/`Table`, and saves the
//! database after every mutating subcommand — `spec.md` §6's front-end data
//! flow, with a `clap` surface in place of the excluded HTTP form.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bplusdb", version, about = "Ordered key-value store over a B+ tree index")]
struct Cli {
    /// Path to the database snapshot file.
    #[arg(short, long, default_value = "bplusdb.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new table.
    CreateTable { name: String, #[arg(long, default_value_t = 4)] order: u16 },
    /// Drop a table.
    DropTable { name: String },
    /// List every table in the database.
    ListTables,
    /// Insert or overwrite a key's value.
    Insert { table: String, key: String, value: String },
    /// Overwrite an existing key's value; fails if absent.
    Update { table: String, key: String, value: String },
    /// Remove a key.
    Delete { table: String, key: String },
    /// Look up a single key.
    Get { table: String, key: String },
    /// Inclusive range scan.
    Range { table: String, lo: String, hi: String },
    /// Rebuild a table's index at a new branching factor.
    Rebuild { table: String, order: u16 },
    /// Emit a Graphviz .dot description of a table's tree.
    Render { table: String, path: PathBuf },
    /// Show table row counts, memory estimates, and operation counters.
    Stats,
    /// Start an interactive shell over this database.
    Shell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::CreateTable { name, order } => commands::tables::create(&cli.database, &name, order),
        Command::DropTable { name } => commands::tables::drop(&cli.database, &name),
        Command::ListTables => commands::tables::list(&cli.database),
        Command::Insert { table, key, value } => commands::data::insert(&cli.database, &table, &key, &value),
        Command::Update { table, key, value } => commands::data::update(&cli.database, &table, &key, &value),
        Command::Delete { table, key } => commands::data::delete(&cli.database, &table, &key),
        Command::Get { table, key } => commands::data::get(&cli.database, &table, &key),
        Command::Range { table, lo, hi } => commands::data::range(&cli.database, &table, &lo, &hi),
        Command::Rebuild { table, order } => commands::data::rebuild(&cli.database, &table, order),
        Command::Render { table, path } => commands::data::render(&cli.database, &table, &path),
        Command::Stats => commands::stats::run(&cli.database),
        Command::Shell => commands::shell::run(&cli.database),
    }
}
