// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Arena-indexed B+ tree nodes.
//!
//! Leaves and internal nodes share one tagged enum, addressed by a stable
//! `NodeId` rather than a pointer or a reference. Parent back-references and
//! leaf `next` links are themselves just `NodeId`s, so re-homing a child
//! during a split, borrow, or merge is a single field write — there is no
//! borrow-checker fight and no way for a child's `parent` to point at a node
//! that doesn't list it as a child, short of a bug in `Tree` itself.
//!
//! ## Node shape
//!
//! - `Leaf`: `keys[i]` paired with `values[i]`, plus `next` (the following
//!   leaf in key order) and `parent`.
//! - `Internal`: `keys.len() + 1 == children.len()`; the subtree under
//!   `children[i]` holds keys `< keys[i]` (and `children[k]` holds keys
//!   `>= keys[k-1]` for the last child).

use serde::{Deserialize, Serialize};

/// Index into a [`Arena`]. Never dereferenced directly by callers outside
/// this crate — it is an opaque handle, not a pointer.
pub type NodeId = u32;

/// A single B+ tree node: either a leaf holding data, or an internal node
/// routing to children.
///
/// `parent` and (for leaves) `next` are intentionally excluded from
/// serialization (`#[serde(skip)]`): they are rebuilt after a snapshot load
/// by a post-order traversal and a leftmost-leaf descent respectively (see
/// `database::snapshot`), rather than carried in the on-disk form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node<K, V> {
    Leaf {
        keys: Vec<K>,
        values: Vec<V>,
        #[serde(skip)]
        next: Option<NodeId>,
        #[serde(skip)]
        parent: Option<NodeId>,
    },
    Internal {
        keys: Vec<K>,
        children: Vec<NodeId>,
        #[serde(skip)]
        parent: Option<NodeId>,
    },
}

impl<K, V> Node<K, V> {
    pub fn new_leaf() -> Self {
        Node::Leaf {
            keys: Vec::new(),
            values: Vec::new(),
            next: None,
            parent: None,
        }
    }

    pub fn new_internal() -> Self {
        Node::Internal {
            keys: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn keys(&self) -> &[K] {
        match self {
            Node::Leaf { keys, .. } => keys,
            Node::Internal { keys, .. } => keys,
        }
    }

    pub fn key_count(&self) -> usize {
        self.keys().len()
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Leaf { parent, .. } => *parent,
            Node::Internal { parent, .. } => *parent,
        }
    }

    pub fn set_parent(&mut self, id: Option<NodeId>) {
        match self {
            Node::Leaf { parent, .. } => *parent = id,
            Node::Internal { parent, .. } => *parent = id,
        }
    }

    /// Node holds more than the maximum key count for `order` (I1) and must
    /// split. Checked after a key has already been inserted into the node,
    /// so the threshold is an exceeds-check, not an at-least-check: a node
    /// is allowed to sit at exactly `max_keys(order)` keys un-split.
    pub fn is_full(&self, order: u16) -> bool {
        self.key_count() > max_keys(order)
    }

    /// Node has fewer keys than the per-variant minimum (I2/I3). The caller
    /// is responsible for exempting the root, which has no minimum.
    pub fn is_underflow(&self, order: u16) -> bool {
        let min = if self.is_leaf() {
            min_leaf_keys(order)
        } else {
            min_internal_keys(order)
        };
        self.key_count() < min
    }
}

/// Maximum keys allowed in any node: `order - 1` (I1).
pub fn max_keys(order: u16) -> usize {
    (order - 1) as usize
}

/// Minimum keys in a non-root leaf: `ceil((order - 1) / 2)` (I2).
///
/// This is the single formula used everywhere an underflow threshold is
/// needed — `spec.md` §9 calls out that the source this was distilled from
/// used a second, inconsistent expression inside its rebalance helper; this
/// crate has exactly one `min_leaf_keys`/`min_internal_keys` pair, called
/// from every site that needs a threshold.
pub fn min_leaf_keys(order: u16) -> usize {
    let m = order as usize;
    (m - 1).div_ceil(2)
}

/// Minimum keys in a non-root internal node: `ceil(order / 2) - 1` (I3).
pub fn min_internal_keys(order: u16) -> usize {
    let m = order as usize;
    m.div_ceil(2) - 1
}

/// A `Vec`-backed store of nodes addressed by [`NodeId`], with a free list so
/// `NodeId`s vacated by a merge or a collapsed root are reused rather than
/// leaking slots. This is Design Notes strategy (a) from `spec.md` §9: an
/// arena of nodes addressed by stable index, recommended there specifically
/// because it avoids borrow hazards and makes re-homing children cheap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id as usize] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            (self.slots.len() - 1) as NodeId
        }
    }

    /// Remove the node at `id` from the arena, returning it. Panics if `id`
    /// is not a live node — callers only ever free nodes they just emptied
    /// via merge, so a vacant slot here means `Tree` has a bug.
    pub fn free(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id as usize]
            .take()
            .expect("freed a node id that was not live");
        self.free.push(id);
        node
    }

    pub fn get(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id as usize]
            .as_ref()
            .expect("dereferenced a node id that was not live")
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id as usize]
            .as_mut()
            .expect("dereferenced a node id that was not live")
    }

    /// Number of live nodes (excludes vacated, reusable slots).
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn iter_live(&self) -> impl Iterator<Item = (NodeId, &Node<K, V>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (i as NodeId, n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_match_invariants_i2_i3() {
        // Order 4: max 3 keys, min leaf ceil(3/2)=2, min internal ceil(4/2)-1=1.
        assert_eq!(max_keys(4), 3);
        assert_eq!(min_leaf_keys(4), 2);
        assert_eq!(min_internal_keys(4), 1);

        // Order 3 (minimum legal): max 2 keys, min leaf ceil(2/2)=1, min internal ceil(3/2)-1=1.
        assert_eq!(max_keys(3), 2);
        assert_eq!(min_leaf_keys(3), 1);
        assert_eq!(min_internal_keys(3), 1);
    }

    #[test]
    fn arena_reuses_freed_slots() {
        let mut arena: Arena<i32, i32> = Arena::new();
        let a = arena.alloc(Node::new_leaf());
        let b = arena.alloc(Node::new_leaf());
        assert_eq!(arena.live_count(), 2);

        arena.free(a);
        assert_eq!(arena.live_count(), 1);

        let c = arena.alloc(Node::new_leaf());
        assert_eq!(c, a, "freed slot should be reused before growing");
        assert_eq!(arena.live_count(), 2);
        let _ = b;
    }
}
