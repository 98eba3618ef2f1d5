// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! CLI-level integration tests: each asserts behavior through a fresh
//! process invocation using `assert_cmd` + `predicates`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn create_insert_get_round_trip() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("cli.db");

    Command::cargo_bin("bplusdb")
        .unwrap()
        .args(["--database", db_path.to_str().unwrap(), "create-table", "people", "--order", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created table"));

    Command::cargo_bin("bplusdb")
        .unwrap()
        .args(["--database", db_path.to_str().unwrap(), "insert", "people", "1", r#"{"name":"Ada"}"#])
        .assert()
        .success();

    Command::cargo_bin("bplusdb")
        .unwrap()
        .args(["--database", db_path.to_str().unwrap(), "get", "people", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada"));
}

#[test]
fn get_on_missing_key_prints_null() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("cli.db");

    Command::cargo_bin("bplusdb")
        .unwrap()
        .args(["--database", db_path.to_str().unwrap(), "create-table", "t", "--order", "4"])
        .assert()
        .success();

    Command::cargo_bin("bplusdb")
        .unwrap()
        .args(["--database", db_path.to_str().unwrap(), "get", "t", "nonexistent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("null"));
}

#[test]
fn insert_into_missing_table_fails() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("cli.db");

    Command::cargo_bin("bplusdb")
        .unwrap()
        .args(["--database", db_path.to_str().unwrap(), "insert", "ghost", "1", "null"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn range_scan_returns_ordered_rows() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("cli.db");

    Command::cargo_bin("bplusdb")
        .unwrap()
        .args(["--database", db_path.to_str().unwrap(), "create-table", "t", "--order", "4"])
        .assert()
        .success();

    for k in 1..=5 {
        Command::cargo_bin("bplusdb")
            .unwrap()
            .args(["--database", db_path.to_str().unwrap(), "insert", "t", &k.to_string(), &k.to_string()])
            .assert()
            .success();
    }

    Command::cargo_bin("bplusdb")
        .unwrap()
        .args(["--database", db_path.to_str().unwrap(), "range", "t", "2", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2\t2\n3\t3\n4\t4\n"));
}
