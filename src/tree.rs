// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! B+ tree index: the ordered core of one table.
//!
//! Generic over any totally-ordered key `K` and opaque value `V`. Owns an
//! [`Arena`] of nodes and a root [`NodeId`]; every public operation restores
//! invariants I1–I9 before returning, so callers may rely on them being true
//! between any two calls (there is no partial-visibility window — see
//! `spec.md` §5).
//!
//! ## Operations
//!
//! - **Point lookup**: O(log_m n) tree descent + binary search in the leaf.
//! - **Insert**: O(log_m n) descent, upsert in the leaf, splits propagate
//!   upward only as far as needed.
//! - **Delete**: O(log_m n) descent, underflow triggers a borrow or merge
//!   that propagates upward only as far as needed.
//! - **Range scan**: O(log_m n + R) — find the start leaf once, then walk
//!   `next` pointers for R results.
//!
//! ## Example
//!
//! ```
//! use bplusdb::Tree;
//!
//! let mut tree = Tree::new(4).unwrap();
//! tree.insert(1, "one");
//! tree.insert(2, "two");
//! assert_eq!(tree.search(&1), Some("one"));
//! assert_eq!(tree.search(&3), None);
//! assert_eq!(tree.range(&1, &2), vec![(1, "one"), (2, "two")]);
//! ```

use crate::error::{StoreError, StoreResult};
use crate::node::{max_keys, min_internal_keys, min_leaf_keys, Arena, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// B+ tree branching factor. Validated once at construction so every other
/// operation can assume `value() >= 3` (`spec.md` §4.8: the constructor is
/// the only operation allowed to fail on well-formed input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order(u16);

impl Order {
    pub fn new(order: u16) -> StoreResult<Self> {
        if order < 3 {
            return Err(StoreError::InvalidOrder { order, min: 3 });
        }
        Ok(Self(order))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

/// An ordered index over one table, backed by a B+ tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree<K, V> {
    order: Order,
    root: NodeId,
    arena: Arena<K, V>,
}

impl<K, V> Tree<K, V> {
    /// Create a new, empty tree with the given branching factor.
    ///
    /// Fails only if `order < 3` (`spec.md` §4.8).
    pub fn new(order: u16) -> StoreResult<Self> {
        Ok(Self::with_order(Order::new(order)?))
    }

    fn with_order(order: Order) -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(Node::new_leaf());
        Self { order, root, arena }
    }

    pub fn order(&self) -> u16 {
        self.order.value()
    }

    /// Estimated in-memory footprint in bytes: the struct header plus, for
    /// every live node, its `Vec` capacities. An estimate, not an exact
    /// accounting of heap allocations owned by `K`/`V` themselves — matching
    /// `original_source/bplustree.py`'s `get_memory_usage`, which is
    /// likewise a structural estimate rather than a precise byte count.
    pub fn memory_estimate(&self) -> usize {
        let mut total = std::mem::size_of::<Self>();
        for (_, node) in self.arena.iter_live() {
            total += std::mem::size_of::<Node<K, V>>();
            match node {
                Node::Leaf { keys, values, .. } => {
                    total += keys.capacity() * std::mem::size_of::<K>();
                    total += values.capacity() * std::mem::size_of::<V>();
                }
                Node::Internal { keys, children, .. } => {
                    total += keys.capacity() * std::mem::size_of::<K>();
                    total += children.capacity() * std::mem::size_of::<NodeId>();
                }
            }
        }
        total
    }

    fn leftmost_leaf(&self) -> NodeId {
        let mut id = self.root;
        loop {
            match self.arena.get(id) {
                Node::Leaf { .. } => return id,
                Node::Internal { children, .. } => id = children[0],
            }
        }
    }

    fn child_at(&self, parent_id: NodeId, i: usize) -> NodeId {
        match self.arena.get(parent_id) {
            Node::Internal { children, .. } => children[i],
            Node::Leaf { .. } => unreachable!("child_at called on a leaf"),
        }
    }

    fn children_len(&self, parent_id: NodeId) -> usize {
        match self.arena.get(parent_id) {
            Node::Internal { children, .. } => children.len(),
            Node::Leaf { .. } => unreachable!("children_len called on a leaf"),
        }
    }

    fn child_index(&self, parent_id: NodeId, child_id: NodeId) -> usize {
        match self.arena.get(parent_id) {
            Node::Internal { children, .. } => children
                .iter()
                .position(|&c| c == child_id)
                .expect("child not found in its recorded parent"),
            Node::Leaf { .. } => unreachable!("child_index called on a leaf"),
        }
    }
}

impl<K: Ord + Clone, V: Clone> Tree<K, V> {
    /// Descend from the root to the leaf that would hold `key`, following
    /// `spec.md` §4.2: at each internal node, take the child at the
    /// `upper_bound` of `key` among its separator keys.
    fn find_leaf(&self, key: &K) -> NodeId {
        let mut current = self.root;
        loop {
            match self.arena.get(current) {
                Node::Leaf { .. } => return current,
                Node::Internal { keys, children, .. } => {
                    let idx = keys.partition_point(|k| k <= key);
                    current = children[idx];
                }
            }
        }
    }

    /// Point lookup. Never fails — an absent key yields `None`.
    pub fn search(&self, key: &K) -> Option<V> {
        let leaf = self.find_leaf(key);
        match self.arena.get(leaf) {
            Node::Leaf { keys, values, .. } => {
                keys.binary_search(key).ok().map(|i| values[i].clone())
            }
            Node::Internal { .. } => unreachable!("find_leaf returned an internal node"),
        }
    }

    /// Insert-or-replace. Always succeeds on a well-formed tree.
    pub fn insert(&mut self, key: K, value: V) {
        let leaf_id = self.find_leaf(&key);

        match self.arena.get_mut(leaf_id) {
            Node::Leaf { keys, values, .. } => match keys.binary_search(&key) {
                Ok(i) => {
                    values[i] = value;
                    return;
                }
                Err(i) => {
                    keys.insert(i, key);
                    values.insert(i, value);
                }
            },
            Node::Internal { .. } => unreachable!("find_leaf returned an internal node"),
        }

        if self.arena.get(leaf_id).is_full(self.order.value()) {
            self.split_leaf(leaf_id);
        }
    }

    /// Overwrite the value for an existing key. Never inserts — returns
    /// `false` if `key` is absent.
    pub fn update(&mut self, key: &K, value: V) -> bool {
        let leaf_id = self.find_leaf(key);
        match self.arena.get_mut(leaf_id) {
            Node::Leaf { keys, values, .. } => match keys.binary_search(key) {
                Ok(i) => {
                    values[i] = value;
                    true
                }
                Err(_) => false,
            },
            Node::Internal { .. } => unreachable!("find_leaf returned an internal node"),
        }
    }

    /// Remove a key. Returns whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        let leaf_id = self.find_leaf(key);

        let existed = match self.arena.get_mut(leaf_id) {
            Node::Leaf { keys, values, .. } => match keys.binary_search(key) {
                Ok(i) => {
                    keys.remove(i);
                    values.remove(i);
                    true
                }
                Err(_) => false,
            },
            Node::Internal { .. } => unreachable!("find_leaf returned an internal node"),
        };

        if !existed {
            return false;
        }

        if leaf_id != self.root && self.arena.get(leaf_id).is_underflow(self.order.value()) {
            self.rebalance(leaf_id);
        }
        self.collapse_root_if_needed();

        true
    }

    /// Inclusive range scan, `lo..=hi`. Empty if `lo > hi`.
    pub fn range(&self, lo: &K, hi: &K) -> Vec<(K, V)> {
        let mut out = Vec::new();
        if lo > hi {
            return out;
        }

        let mut cur = Some(self.find_leaf(lo));
        while let Some(id) = cur {
            let (keys, values, next) = match self.arena.get(id) {
                Node::Leaf { keys, values, next, .. } => (keys, values, *next),
                Node::Internal { .. } => unreachable!("leaf chain hit an internal node"),
            };
            if let Some(first) = keys.first() {
                if first > hi {
                    break;
                }
            }
            for (k, v) in keys.iter().zip(values.iter()) {
                if k < lo {
                    continue;
                }
                if k > hi {
                    return out;
                }
                out.push((k.clone(), v.clone()));
            }
            cur = next;
        }
        out
    }

    /// Every `(key, value)` pair in ascending key order.
    pub fn scan_all(&self) -> Vec<(K, V)> {
        let mut out = Vec::new();
        let mut cur = Some(self.leftmost_leaf());
        while let Some(id) = cur {
            match self.arena.get(id) {
                Node::Leaf { keys, values, next, .. } => {
                    out.extend(keys.iter().cloned().zip(values.iter().cloned()));
                    cur = *next;
                }
                Node::Internal { .. } => unreachable!("leaf chain hit an internal node"),
            }
        }
        out
    }

    /// Read every record via [`scan_all`](Self::scan_all), build a fresh
    /// tree at `new_order`, and reinsert in order — `spec.md` §6's "Rebuild
    /// with new order". Fails only if `new_order < 3`.
    pub fn rebuild(&self, new_order: u16) -> StoreResult<Self> {
        let mut rebuilt = Self::new(new_order)?;
        for (k, v) in self.scan_all() {
            rebuilt.insert(k, v);
        }
        Ok(rebuilt)
    }

    // --- split (spec.md §4.5) ---

    fn split_leaf(&mut self, leaf_id: NodeId) {
        let t = (self.order.value() / 2) as usize;

        let (sib_keys, sib_values, old_next) = match self.arena.get_mut(leaf_id) {
            Node::Leaf { keys, values, next, .. } => {
                (keys.split_off(t), values.split_off(t), *next)
            }
            Node::Internal { .. } => unreachable!("split_leaf called on an internal node"),
        };
        let parent = self.arena.get(leaf_id).parent();

        let sibling = Node::Leaf {
            keys: sib_keys,
            values: sib_values,
            next: old_next,
            parent,
        };
        let sibling_id = self.arena.alloc(sibling);

        match self.arena.get_mut(leaf_id) {
            Node::Leaf { next, .. } => *next = Some(sibling_id),
            Node::Internal { .. } => unreachable!(),
        }

        // Copy-up: the promoted key stays in the sibling.
        let promoted = self.arena.get(sibling_id).keys()[0].clone();
        self.insert_into_parent(leaf_id, promoted, sibling_id, parent);
    }

    fn split_internal(&mut self, node_id: NodeId) {
        let t = (self.order.value() / 2) as usize;

        let (promoted, sib_keys, sib_children) = match self.arena.get_mut(node_id) {
            Node::Internal { keys, children, .. } => {
                let promoted = keys[t].clone();
                let sib_keys = keys.split_off(t + 1);
                keys.truncate(t);
                let sib_children = children.split_off(t + 1);
                (promoted, sib_keys, sib_children)
            }
            Node::Leaf { .. } => unreachable!("split_internal called on a leaf"),
        };
        let parent = self.arena.get(node_id).parent();

        let sibling = Node::Internal {
            keys: sib_keys,
            children: sib_children.clone(),
            parent,
        };
        let sibling_id = self.arena.alloc(sibling);
        for child in sib_children {
            self.arena.get_mut(child).set_parent(Some(sibling_id));
        }

        // Push-up: the promoted key is removed from both halves.
        self.insert_into_parent(node_id, promoted, sibling_id, parent);
    }

    fn insert_into_parent(
        &mut self,
        left: NodeId,
        separator: K,
        right: NodeId,
        parent: Option<NodeId>,
    ) {
        match parent {
            None => {
                let mut new_root = Node::new_internal();
                match &mut new_root {
                    Node::Internal { keys, children, .. } => {
                        keys.push(separator);
                        children.push(left);
                        children.push(right);
                    }
                    Node::Leaf { .. } => unreachable!(),
                }
                let root_id = self.arena.alloc(new_root);
                self.arena.get_mut(left).set_parent(Some(root_id));
                self.arena.get_mut(right).set_parent(Some(root_id));
                self.root = root_id;
            }
            Some(parent_id) => {
                let pos = self.child_index(parent_id, left);
                match self.arena.get_mut(parent_id) {
                    Node::Internal { keys, children, .. } => {
                        keys.insert(pos, separator);
                        children.insert(pos + 1, right);
                    }
                    Node::Leaf { .. } => unreachable!(),
                }
                self.arena.get_mut(right).set_parent(Some(parent_id));

                if self.arena.get(parent_id).is_full(self.order.value()) {
                    self.split_internal(parent_id);
                }
            }
        }
    }

    // --- rebalance on underflow (spec.md §4.6) ---

    fn rebalance(&mut self, mut node_id: NodeId) {
        let order = self.order.value();
        loop {
            if !self.arena.get(node_id).is_underflow(order) {
                return;
            }
            let parent_id = match self.arena.get(node_id).parent() {
                Some(p) => p,
                None => return, // root: no parent to rebalance against
            };

            let index = self.child_index(parent_id, node_id);
            let min_keys = if self.arena.get(node_id).is_leaf() {
                min_leaf_keys(order)
            } else {
                min_internal_keys(order)
            };

            let left_id = (index > 0).then(|| self.child_at(parent_id, index - 1));
            let right_id = (index + 1 < self.children_len(parent_id))
                .then(|| self.child_at(parent_id, index + 1));

            if let Some(left) = left_id {
                if self.arena.get(left).key_count() > min_keys {
                    self.borrow_from_left(parent_id, index);
                    return;
                }
            }
            if let Some(right) = right_id {
                if self.arena.get(right).key_count() > min_keys {
                    self.borrow_from_right(parent_id, index);
                    return;
                }
            }

            // Neither sibling can lend a key: merge. Prefer the left
            // sibling when both exist, per spec.md §4.6's tie-break policy.
            if left_id.is_some() {
                self.merge(parent_id, index - 1);
            } else {
                self.merge(parent_id, index);
            }

            if self.arena.get(parent_id).parent().is_none() {
                return; // parent is root; collapse_root_if_needed handles it
            }
            node_id = parent_id;
        }
    }

    fn borrow_from_left(&mut self, parent_id: NodeId, index: usize) {
        let left_id = self.child_at(parent_id, index - 1);
        let child_id = self.child_at(parent_id, index);

        if self.arena.get(child_id).is_leaf() {
            let (key, value) = match self.arena.get_mut(left_id) {
                Node::Leaf { keys, values, .. } => (keys.pop().unwrap(), values.pop().unwrap()),
                Node::Internal { .. } => unreachable!(),
            };
            match self.arena.get_mut(child_id) {
                Node::Leaf { keys, values, .. } => {
                    keys.insert(0, key.clone());
                    values.insert(0, value);
                }
                Node::Internal { .. } => unreachable!(),
            }
            match self.arena.get_mut(parent_id) {
                Node::Internal { keys, .. } => keys[index - 1] = key,
                Node::Leaf { .. } => unreachable!(),
            }
        } else {
            let separator = match self.arena.get(parent_id) {
                Node::Internal { keys, .. } => keys[index - 1].clone(),
                Node::Leaf { .. } => unreachable!(),
            };
            let moved_child = match self.arena.get_mut(left_id) {
                Node::Internal { children, .. } => children.pop().unwrap(),
                Node::Leaf { .. } => unreachable!(),
            };
            let new_separator = match self.arena.get_mut(left_id) {
                Node::Internal { keys, .. } => keys.pop().unwrap(),
                Node::Leaf { .. } => unreachable!(),
            };
            match self.arena.get_mut(child_id) {
                Node::Internal { keys, children, .. } => {
                    keys.insert(0, separator);
                    children.insert(0, moved_child);
                }
                Node::Leaf { .. } => unreachable!(),
            }
            self.arena.get_mut(moved_child).set_parent(Some(child_id));
            match self.arena.get_mut(parent_id) {
                Node::Internal { keys, .. } => keys[index - 1] = new_separator,
                Node::Leaf { .. } => unreachable!(),
            }
        }
    }

    fn borrow_from_right(&mut self, parent_id: NodeId, index: usize) {
        let right_id = self.child_at(parent_id, index + 1);
        let child_id = self.child_at(parent_id, index);

        if self.arena.get(child_id).is_leaf() {
            let (key, value) = match self.arena.get_mut(right_id) {
                Node::Leaf { keys, values, .. } => (keys.remove(0), values.remove(0)),
                Node::Internal { .. } => unreachable!(),
            };
            match self.arena.get_mut(child_id) {
                Node::Leaf { keys, values, .. } => {
                    keys.push(key);
                    values.push(value);
                }
                Node::Internal { .. } => unreachable!(),
            }
            let new_separator = match self.arena.get(right_id) {
                Node::Leaf { keys, .. } => keys[0].clone(),
                Node::Internal { .. } => unreachable!(),
            };
            match self.arena.get_mut(parent_id) {
                Node::Internal { keys, .. } => keys[index] = new_separator,
                Node::Leaf { .. } => unreachable!(),
            }
        } else {
            let separator = match self.arena.get(parent_id) {
                Node::Internal { keys, .. } => keys[index].clone(),
                Node::Leaf { .. } => unreachable!(),
            };
            let moved_child = match self.arena.get_mut(right_id) {
                Node::Internal { children, .. } => children.remove(0),
                Node::Leaf { .. } => unreachable!(),
            };
            let new_separator = match self.arena.get_mut(right_id) {
                Node::Internal { keys, .. } => keys.remove(0),
                Node::Leaf { .. } => unreachable!(),
            };
            match self.arena.get_mut(child_id) {
                Node::Internal { keys, children, .. } => {
                    keys.push(separator);
                    children.push(moved_child);
                }
                Node::Leaf { .. } => unreachable!(),
            }
            self.arena.get_mut(moved_child).set_parent(Some(child_id));
            match self.arena.get_mut(parent_id) {
                Node::Internal { keys, .. } => keys[index] = new_separator,
                Node::Leaf { .. } => unreachable!(),
            }
        }
    }

    /// Merge `children[s]` and `children[s + 1]` of `parent_id`, discarding
    /// the separator between them (or folding it into the merged node for
    /// internal merges, per spec.md §4.6).
    fn merge(&mut self, parent_id: NodeId, s: usize) {
        let left_id = self.child_at(parent_id, s);
        let right_id = self.child_at(parent_id, s + 1);

        if self.arena.get(left_id).is_leaf() {
            let (r_keys, r_values, r_next) = match self.arena.free(right_id) {
                Node::Leaf { keys, values, next, .. } => (keys, values, next),
                Node::Internal { .. } => unreachable!(),
            };
            match self.arena.get_mut(left_id) {
                Node::Leaf { keys, values, next, .. } => {
                    keys.extend(r_keys);
                    values.extend(r_values);
                    *next = r_next;
                }
                Node::Internal { .. } => unreachable!(),
            }
        } else {
            let (r_keys, r_children) = match self.arena.free(right_id) {
                Node::Internal { keys, children, .. } => (keys, children),
                Node::Leaf { .. } => unreachable!(),
            };
            let separator = match self.arena.get(parent_id) {
                Node::Internal { keys, .. } => keys[s].clone(),
                Node::Leaf { .. } => unreachable!(),
            };
            match self.arena.get_mut(left_id) {
                Node::Internal { keys, children, .. } => {
                    keys.push(separator);
                    keys.extend(r_keys);
                    children.extend(r_children.iter().copied());
                }
                Node::Leaf { .. } => unreachable!(),
            }
            for child in r_children {
                self.arena.get_mut(child).set_parent(Some(left_id));
            }
        }

        match self.arena.get_mut(parent_id) {
            Node::Internal { keys, children, .. } => {
                keys.remove(s);
                children.remove(s + 1);
            }
            Node::Leaf { .. } => unreachable!(),
        }
    }

    fn collapse_root_if_needed(&mut self) {
        loop {
            let only_child = match self.arena.get(self.root) {
                Node::Internal { keys, children, .. } if keys.is_empty() && children.len() == 1 => {
                    children[0]
                }
                _ => return,
            };
            self.arena.free(self.root);
            self.arena.get_mut(only_child).set_parent(None);
            self.root = only_child;
        }
    }

    /// Rebuild every `parent` back-reference by a post-order arena walk, and
    /// every leaf `next` link by descending to the leftmost leaf and
    /// threading leaves in ascending key order. Used after a snapshot load,
    /// where both are omitted from the on-disk form (`spec.md` §6).
    pub(crate) fn restore_transient_links(&mut self) {
        let root = self.root;
        self.restore_parents(root, None);

        let mut leaves = Vec::new();
        self.collect_leaves_in_order(root, &mut leaves);
        for pair in leaves.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match self.arena.get_mut(a) {
                Node::Leaf { next, .. } => *next = Some(b),
                Node::Internal { .. } => unreachable!(),
            }
        }
        if let Some(&last) = leaves.last() {
            match self.arena.get_mut(last) {
                Node::Leaf { next, .. } => *next = None,
                Node::Internal { .. } => unreachable!(),
            }
        }
    }

    fn restore_parents(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.arena.get_mut(id).set_parent(parent);
        let children = match self.arena.get(id) {
            Node::Internal { children, .. } => children.clone(),
            Node::Leaf { .. } => return,
        };
        for child in children {
            self.restore_parents(child, Some(id));
        }
    }

    fn collect_leaves_in_order(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match self.arena.get(id) {
            Node::Leaf { .. } => out.push(id),
            Node::Internal { children, .. } => {
                for &child in children {
                    self.collect_leaves_in_order(child, out);
                }
            }
        }
    }
}

impl<K: Ord + Clone + std::fmt::Display, V> Tree<K, V> {
    /// Emit a Graphviz `.dot` description of the tree's structure —
    /// internal nodes in blue, leaves in yellow, with a dashed chain linking
    /// leaves in key order — matching
    /// `original_source/bplustree.py`'s `visualize_tree`.
    pub fn render_to<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        let mut dot = String::from("digraph BPlusTree {\n  node [shape=box];\n");
        self.render_node(self.root, &mut dot);
        self.render_leaf_chain(&mut dot);
        dot.push_str("}\n");

        std::fs::write(path.as_ref(), dot).map_err(|e| StoreError::SnapshotIoError {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })
    }

    fn render_node(&self, id: NodeId, dot: &mut String) {
        match self.arena.get(id) {
            Node::Leaf { keys, .. } => {
                let label = keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join("|");
                dot.push_str(&format!(
                    "  n{id} [label=\"{label}\", style=filled, fillcolor=lightyellow];\n"
                ));
            }
            Node::Internal { keys, children, .. } => {
                let label = keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join("|");
                dot.push_str(&format!(
                    "  n{id} [label=\"{label}\", style=filled, fillcolor=lightblue];\n"
                ));
                for &child in children {
                    dot.push_str(&format!("  n{id} -> n{child};\n"));
                    self.render_node(child, dot);
                }
            }
        }
    }

    fn render_leaf_chain(&self, dot: &mut String) {
        let mut prev: Option<NodeId> = None;
        let mut cur = Some(self.leftmost_leaf());
        while let Some(id) = cur {
            if let Some(p) = prev {
                dot.push_str(&format!("  n{p} -> n{id} [style=dashed, constraint=false, arrowhead=none];\n"));
            }
            prev = Some(id);
            cur = match self.arena.get(id) {
                Node::Leaf { next, .. } => *next,
                Node::Internal { .. } => None,
            };
        }
    }
}
