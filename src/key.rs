// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Concrete key/value types for the `Table`/`Database` layer.
//!
//! `Tree<K, V>` stays generic (see `tree.rs`), but a `Database` has to hold
//! heterogeneous tables in one map and one snapshot file, so something has
//! to pick a single concrete `K`/`V` pair. This is that pair: `Key` mirrors
//! the front-end rule "numeric if parseable, else string", and `Value` is a
//! JSON document — matching the "value parsed as structured data from a
//! JSON text" data flow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A table key: either an integer or arbitrary text, ordered with integers
/// before text and each variant ordered by its payload. Mixing variants
/// within one tree is well-ordered but not meaningful — `spec.md` §9 leaves
/// that case explicitly undefined, so any consistent total order is enough.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl Key {
    /// Parse the way the front-end does: an integer if the text parses as
    /// one, otherwise the text itself.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) => Key::Int(n),
            Err(_) => Key::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A table value: an arbitrary JSON document. A stored `Value::Null` is a
/// present value distinct from an absent key — `search` returns
/// `Option<Value>`, so `Some(Value::Null)` and `None` never collapse into
/// each other (`spec.md` §9's third open question, resolved in the core's
/// favor).
pub type Value = serde_json::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prefers_integer() {
        assert_eq!(Key::parse("42"), Key::Int(42));
        assert_eq!(Key::parse("-7"), Key::Int(-7));
        assert_eq!(Key::parse("abc"), Key::Text("abc".to_string()));
        assert_eq!(Key::parse("42abc"), Key::Text("42abc".to_string()));
    }

    #[test]
    fn int_keys_sort_before_text_keys() {
        let mut keys = vec![Key::Text("a".into()), Key::Int(5), Key::Int(1)];
        keys.sort();
        assert_eq!(keys, vec![Key::Int(1), Key::Int(5), Key::Text("a".into())]);
    }

    #[test]
    fn null_value_is_distinct_from_absent() {
        let v: Value = serde_json::Value::Null;
        assert_eq!(Some(v), Some(serde_json::Value::Null));
        assert_ne!(Some(serde_json::Value::Null), None::<Value>);
    }
}
