// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios exercised at the `Database`/`Table` layer, on top of
//! the `Key`/`Value` concretization (the core `Tree` itself is exercised
//! directly in `src/tree.rs`'s unit tests).

use bplusdb::{Database, Key};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn upsert_preserves_cardinality_scenario_4() {
    let mut db = Database::open("unused-for-this-test.db");
    db.create_table("t", 4).unwrap();
    let table = db.get_table_mut("t").unwrap();

    table.insert(Key::Int(7), json!("a"));
    table.insert(Key::Int(7), json!("b"));

    assert_eq!(table.scan_all(), vec![(Key::Int(7), json!("b"))]);
}

#[test]
fn snapshot_durability_scenario_6_through_database_api() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("durability.db");

    let mut db = Database::open(&path);
    db.create_table("t", 4).unwrap();
    {
        let table = db.get_table_mut("t").unwrap();
        for k in 0..100i64 {
            table.insert(Key::Int(k), json!({"value": k}));
        }
    }
    db.save().unwrap();

    let reopened = Database::open(&path);
    assert_eq!(
        reopened.get_table("t").unwrap().scan_all(),
        db.get_table("t").unwrap().scan_all(),
    );
}

#[test]
fn directory_lifecycle_round_trip() {
    let dir = tempdir().unwrap();

    let mut db = bplusdb::database::create_database("shop", dir.path()).unwrap();
    db.create_table("orders", 4).unwrap();
    db.get_table_mut("orders").unwrap().insert(Key::Text("order-1".into()), json!({"total": 42}));
    db.save().unwrap();

    let reopened = bplusdb::database::get_database("shop", dir.path()).unwrap();
    assert_eq!(
        reopened.get_table("orders").unwrap().search(&Key::Text("order-1".into())),
        Some(json!({"total": 42})),
    );

    assert!(bplusdb::database::delete_database("shop", dir.path()).unwrap());
    assert!(bplusdb::database::get_database("shop", dir.path()).is_err());
}
