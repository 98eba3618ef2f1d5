// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Demo: create a database, populate two tables, persist it, and reload.
//!
//! A direct port of `original_source/db_management_system/database/db_manager.py`'s
//! `__main__` walkthrough: create `users` (order 3) and `products` (order 5),
//! insert a few records, run a point lookup, a miss, and a range query,
//! render one table, save, drop a table, and reopen from disk to show the
//! remaining table survived the round trip.

use bplusdb::{Database, Key};
use serde_json::json;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = Path::new("/tmp/bplusdb_demo/test_db.db");
    std::fs::create_dir_all(db_path.parent().unwrap())?;

    println!("--- Initial state ---");
    let mut db = Database::open(db_path);
    println!("Tables: {:?}", db.list_tables());

    if db.get_table("users").is_none() {
        db.create_table("users", 3)?;
    }
    if db.get_table("products").is_none() {
        db.create_table("products", 5)?;
    }

    println!("\n--- After creation ---");
    println!("Tables: {:?}", db.list_tables());

    println!("\n--- Populating users ---");
    {
        let users = db.get_table_mut("users").unwrap();
        if users.search(&Key::Int(1)).is_none() {
            users.insert(Key::Int(1), json!({"name": "Alice", "email": "alice@example.com"}));
            users.insert(Key::Int(5), json!({"name": "Bob", "email": "bob@example.com"}));
            users.insert(Key::Int(3), json!({"name": "Charlie", "email": "charlie@example.com"}));
        } else {
            println!("User data seems to exist already.");
        }
        println!("User 3: {:?}", users.search(&Key::Int(3)));
        println!("User 4 (non-existent): {:?}", users.search(&Key::Int(4)));
        users.render_to("/tmp/bplusdb_demo/users_table.dot")?;
    }

    println!("\n--- Populating products ---");
    {
        let products = db.get_table_mut("products").unwrap();
        if products.search(&Key::Int(101)).is_none() {
            products.insert(Key::Int(101), json!({"name": "Laptop", "price": 1200}));
            products.insert(Key::Int(205), json!({"name": "Mouse", "price": 25}));
            products.insert(Key::Int(150), json!({"name": "Keyboard", "price": 75}));
        } else {
            println!("Product data seems to exist already.");
        }
        println!("Products 100-200: {:?}", products.range(&Key::Int(100), &Key::Int(200)));
        products.render_to("/tmp/bplusdb_demo/products_table.dot")?;
    }

    println!("\n--- Saving database ---");
    db.save()?;

    println!("\n--- Deleting a table ---");
    db.delete_table("products");
    println!("Tables after delete: {:?}", db.list_tables());

    println!("\n--- Loading database again (from file) ---");
    let reloaded = Database::open(db_path);
    println!("Loaded tables: {:?}", reloaded.list_tables());
    if let Some(users) = reloaded.get_table("users") {
        println!("User 5 from loaded DB: {:?}", users.search(&Key::Int(5)));
    }

    Ok(())
}
