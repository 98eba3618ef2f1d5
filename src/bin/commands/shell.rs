// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Interactive shell (REPL) over a single database file.

use anyhow::Result;
use bplusdb::{Database, Key};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let mut db = Database::open(path);

    println!("bplusdb shell");
    println!("Database: {}", path.display());
    println!("Type .help for help, .exit to quit\n");

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("bplusdb> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                if trimmed.starts_with('.') {
                    match handle_dot_command(trimmed, &mut db, path) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => eprintln!("Error: {e}"),
                    }
                } else {
                    eprintln!("Unrecognized input. Type .help for the list of commands.");
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err:?}");
                break;
            }
        }
    }

    Ok(())
}

fn handle_dot_command(cmd: &str, db: &mut Database, path: &Path) -> Result<bool> {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts[0] {
        ".exit" | ".quit" => {
            println!("Goodbye!");
            return Ok(true);
        }

        ".help" => {
            println!("Special commands:");
            println!("  .tables                        List all tables");
            println!("  .create <table> [order]        Create a table (default order 4)");
            println!("  .drop <table>                  Drop a table");
            println!("  .insert <table> <key> <json>   Insert or overwrite a key");
            println!("  .get <table> <key>              Look up a key");
            println!("  .delete <table> <key>           Remove a key");
            println!("  .range <table> <lo> <hi>        Inclusive range scan");
            println!("  .stats                          Show database statistics");
            println!("  .help                           Show this help");
            println!("  .exit                           Exit shell");
        }

        ".tables" => {
            let tables = db.list_tables();
            if tables.is_empty() {
                println!("No tables found");
            } else {
                for name in tables {
                    println!("  - {name}");
                }
            }
        }

        ".create" => {
            let Some(&name) = parts.get(1) else {
                eprintln!("usage: .create <table> [order]");
                return Ok(false);
            };
            let order: u16 = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(4);
            match db.create_table(name, order) {
                Ok(()) => {
                    db.save()?;
                    println!("Created table '{name}' (order {order})");
                }
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        ".drop" => {
            let Some(&name) = parts.get(1) else {
                eprintln!("usage: .drop <table>");
                return Ok(false);
            };
            if db.delete_table(name) {
                db.save()?;
                println!("Dropped table '{name}'");
            } else {
                println!("No such table: {name}");
            }
        }

        ".insert" => {
            let (Some(&table), Some(&key), Some(value_json)) = (parts.get(1), parts.get(2), parts.get(3..).map(|s| s.join(" "))) else {
                eprintln!("usage: .insert <table> <key> <json-value>");
                return Ok(false);
            };
            match db.get_table_mut(table) {
                Some(t) => match serde_json::from_str(&value_json) {
                    Ok(value) => {
                        t.insert(Key::parse(key), value);
                        db.save()?;
                        println!("OK");
                    }
                    Err(e) => eprintln!("Invalid JSON: {e}"),
                },
                None => eprintln!("No such table: {table}"),
            }
        }

        ".get" => {
            let (Some(&table), Some(&key)) = (parts.get(1), parts.get(2)) else {
                eprintln!("usage: .get <table> <key>");
                return Ok(false);
            };
            match db.get_table(table) {
                Some(t) => match t.search(&Key::parse(key)) {
                    Some(value) => println!("{value}"),
                    None => println!("null"),
                },
                None => eprintln!("No such table: {table}"),
            }
        }

        ".delete" => {
            let (Some(&table), Some(&key)) = (parts.get(1), parts.get(2)) else {
                eprintln!("usage: .delete <table> <key>");
                return Ok(false);
            };
            match db.get_table_mut(table) {
                Some(t) => {
                    if t.delete(&Key::parse(key)) {
                        db.save()?;
                        println!("OK");
                    } else {
                        println!("No such key: {key}");
                    }
                }
                None => eprintln!("No such table: {table}"),
            }
        }

        ".range" => {
            let (Some(&table), Some(&lo), Some(&hi)) = (parts.get(1), parts.get(2), parts.get(3)) else {
                eprintln!("usage: .range <table> <lo> <hi>");
                return Ok(false);
            };
            match db.get_table(table) {
                Some(t) => {
                    for (key, value) in t.range(&Key::parse(lo), &Key::parse(hi)) {
                        println!("{key}\t{value}");
                    }
                }
                None => eprintln!("No such table: {table}"),
            }
        }

        ".stats" => {
            let stats = db.stats();
            for table in &stats.tables {
                println!("  - {} rows={} ~{} bytes", table.name, table.row_count, table.memory_estimate);
            }
            println!(
                "inserts={} updates={} deletes={} searches={} ranges={}",
                stats.metrics.inserts, stats.metrics.updates, stats.metrics.deletes, stats.metrics.searches, stats.metrics.ranges
            );
        }

        other => {
            eprintln!("Unknown command: {other}. Type .help for the list of commands.");
        }
    }

    let _ = path;
    Ok(false)
}
