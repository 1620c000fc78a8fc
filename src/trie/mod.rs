// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-memory radix trie.
//!
//! Nodes live in one `Vec` and point at each other by index. The trie only
//! ever grows during a build pass and is thrown away whole by compaction, so
//! an arena is all the ownership story we need.
//!
//! Every edge is compressed: a node's `label` is the run of bytes from its
//! parent to it. Children are kept sorted by the first byte of their label,
//! and no two siblings share a first byte, so choosing the next child is a
//! single byte comparison per sibling.
//!
//! ```text
//! insert "cat", "car", "cart", "dog"
//!
//!   (root)
//!    ├── "ca"
//!    │    ├── "r" ●
//!    │    │    └── "t" ●
//!    │    └── "t" ●
//!    └── "dog" ●                 ● = node carries a payload
//! ```
//!
//! Insertion walks down from the root and ends in exactly one of the cases
//! of [`InsertCase`]. Splits happen in place: the node that gets split keeps
//! its arena index (so its parent's child slot stays valid) and the old tail
//! moves into a freshly appended node.

pub mod compact;

use std::mem;

use crate::error::{IndexError, Result};
use crate::types::{Posting, PostingsList, PostingsRef};

pub use compact::{compact, FlattenedTrie};

/// Arena index of a node.
pub type NodeId = u32;

/// The root is always the first node in the arena.
pub const ROOT: NodeId = 0;

// ============================================================================
// PAYLOAD
// ============================================================================

/// What a trie node carries, and how repeated inserts fold into it.
pub trait Payload {
    /// What one `insert` call adds.
    type Item;

    fn from_item(item: Self::Item) -> Self;

    fn absorb(&mut self, item: Self::Item);

    /// Heap bytes owned by the payload, for the memory estimate.
    fn heap_bytes(&self) -> usize {
        0
    }
}

impl Payload for PostingsList {
    type Item = Posting;

    fn from_item(item: Posting) -> Self {
        vec![item]
    }

    fn absorb(&mut self, item: Posting) {
        self.push(item);
    }

    fn heap_bytes(&self) -> usize {
        self.capacity() * mem::size_of::<Posting>()
    }
}

/// Vocabulary tries hold one postings reference per token. A second insert
/// of the same token replaces it; callers that must reject duplicates check
/// for [`InsertCase::Exact`] with `appended` set.
impl Payload for PostingsRef {
    type Item = PostingsRef;

    fn from_item(item: PostingsRef) -> Self {
        item
    }

    fn absorb(&mut self, item: PostingsRef) {
        *self = item;
    }
}

// ============================================================================
// NODES
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) label: Vec<u8>,
    /// `(first label byte, child)`, sorted by byte, bytes unique.
    pub(crate) children: Vec<(u8, NodeId)>,
    pub(crate) value: Option<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            label: Vec::new(),
            children: Vec::new(),
            value: None,
        }
    }
}

impl<T> Node<T> {
    fn leaf(label: &[u8], value: T) -> Self {
        Self {
            label: label.to_vec(),
            children: Vec::new(),
            value: Some(value),
        }
    }

    /// Position of the child starting with `byte`, or where it would go.
    ///
    /// Linear scan: nodes have few children, and the sort order lets us stop
    /// at the first byte past the target.
    fn child_slot(&self, byte: u8) -> std::result::Result<usize, usize> {
        for (i, &(first, _)) in self.children.iter().enumerate() {
            if first == byte {
                return Ok(i);
            }
            if first > byte {
                return Err(i);
            }
        }
        Err(self.children.len())
    }
}

/// Fixed per-node cost used by the memory estimate.
const NODE_OVERHEAD: usize = 64;

/// Which structural case an insertion ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertCase {
    /// The token ends exactly at an existing node. `appended` is true when
    /// that node already had a payload and the item was folded into it.
    Exact { appended: bool },
    /// A new leaf under a node that had no children.
    NewLeaf,
    /// The token was a strict prefix of a label: the node was split and the
    /// item attached to the now-internal upper half.
    SplitPrefix,
    /// Token and label diverged after a shared prefix: a new internal node
    /// holds the prefix, with the old tail and the new leaf beneath it.
    SplitDiverge,
    /// No child shared a first byte with the token: a new leaf was added
    /// next to the existing children.
    NewSibling,
}

// ============================================================================
// TRIE
// ============================================================================

/// Edge-compressed byte trie with payloads at token ends.
#[derive(Debug, Clone)]
pub struct RadixTrie<T> {
    pub(crate) nodes: Vec<Node<T>>,
    tokens: usize,
    approx_bytes: usize,
}

impl<T: Payload> Default for RadixTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Payload> RadixTrie<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            tokens: 0,
            approx_bytes: NODE_OVERHEAD,
        }
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens == 0
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Running estimate of the trie's heap footprint in bytes.
    pub fn approx_bytes(&self) -> usize {
        self.approx_bytes
    }

    /// Add `item` under `token`.
    ///
    /// An empty token lands on the root, which never carries a payload in a
    /// well-formed index; the tokenizer never produces one.
    pub fn insert(&mut self, token: &[u8], item: T::Item) -> InsertCase {
        let mut node = ROOT as usize;
        let mut rest = token;

        loop {
            // Invariant: the label of `node` is fully matched.
            let Some(&first) = rest.first() else {
                return self.absorb_at(node, item);
            };

            let child = match self.nodes[node].child_slot(first) {
                Ok(i) => self.nodes[node].children[i].1 as usize,
                Err(slot) => {
                    let case = if self.nodes[node].children.is_empty() {
                        InsertCase::NewLeaf
                    } else {
                        InsertCase::NewSibling
                    };
                    self.attach_leaf(node, slot, rest, item);
                    return case;
                }
            };

            let label = &self.nodes[child].label;
            let common = common_prefix(label, rest);
            let label_len = label.len();

            if common == label_len {
                node = child;
                rest = &rest[common..];
                continue;
            }

            // 0 < common < label_len: the child's label must be cut.
            self.split(child, common);
            if common == rest.len() {
                return match self.absorb_at(child, item) {
                    InsertCase::Exact { .. } => InsertCase::SplitPrefix,
                    other => other,
                };
            }

            let tail = &rest[common..];
            let slot = match self.nodes[child].child_slot(tail[0]) {
                Ok(i) | Err(i) => i,
            };
            self.attach_leaf(child, slot, tail, item);
            return InsertCase::SplitDiverge;
        }
    }

    fn absorb_at(&mut self, node: usize, item: T::Item) -> InsertCase {
        let slot = &mut self.nodes[node].value;
        match slot {
            Some(value) => {
                let before = value.heap_bytes();
                value.absorb(item);
                self.approx_bytes += value.heap_bytes().saturating_sub(before);
                InsertCase::Exact { appended: true }
            }
            None => {
                let value = T::from_item(item);
                self.approx_bytes += value.heap_bytes();
                *slot = Some(value);
                self.tokens += 1;
                InsertCase::Exact { appended: false }
            }
        }
    }

    fn attach_leaf(&mut self, parent: usize, slot: usize, label: &[u8], item: T::Item) {
        let value = T::from_item(item);
        self.approx_bytes += NODE_OVERHEAD + label.len() + value.heap_bytes() + 8;

        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::leaf(label, value));
        self.nodes[parent].children.insert(slot, (label[0], id));
        self.tokens += 1;
    }

    /// Cut `node`'s label after `at` bytes. The node keeps the head; a new
    /// node takes the tail along with the old children and payload.
    fn split(&mut self, node: usize, at: usize) {
        let upper = &mut self.nodes[node];
        let tail_label = upper.label.split_off(at);
        let tail = Node {
            children: mem::take(&mut upper.children),
            value: upper.value.take(),
            label: tail_label,
        };

        let id = self.nodes.len() as NodeId;
        let first = tail.label[0];
        self.nodes.push(tail);
        self.nodes[node].children.push((first, id));
        self.approx_bytes += NODE_OVERHEAD + 8;
    }

    /// Payload stored under exactly `token`.
    pub fn get(&self, token: &[u8]) -> Option<&T> {
        let mut node = &self.nodes[ROOT as usize];
        let mut rest = token;
        loop {
            let Some(&first) = rest.first() else {
                return node.value.as_ref();
            };
            let i = node.child_slot(first).ok()?;
            let child = self.nodes.get(node.children[i].1 as usize)?;
            rest = rest.strip_prefix(child.label.as_slice())?;
            node = child;
        }
    }

    /// All `(token, payload)` pairs in lexicographic byte order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<u8>, &T)> + '_ {
        let mut out = Vec::with_capacity(self.tokens);
        let mut stack: Vec<(usize, usize)> = vec![(ROOT as usize, 0)];
        let mut path = Vec::new();
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            path.truncate(depth);
            path.extend_from_slice(&node.label);
            if let Some(value) = &node.value {
                out.push((path.clone(), value));
            }
            for &(_, child) in node.children.iter().rev() {
                stack.push((child as usize, path.len()));
            }
        }
        out.into_iter()
    }

    /// Check the structural invariants: children sorted by unique first
    /// byte, each first byte matching the child's label, no empty labels
    /// below the root, no payload on the root.
    pub fn check_invariants(&self) -> Result<()> {
        if self.nodes[ROOT as usize].value.is_some() {
            return Err(IndexError::inconsistent("root carries a payload"));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            if id != ROOT as usize && node.label.is_empty() {
                return Err(IndexError::inconsistent(format!(
                    "node {} has an empty label",
                    id
                )));
            }
            if !node.children.windows(2).all(|w| w[0].0 < w[1].0) {
                return Err(IndexError::inconsistent(format!(
                    "children of node {} are not strictly sorted by first byte",
                    id
                )));
            }
            for &(first, child) in &node.children {
                let label_first = self
                    .nodes
                    .get(child as usize)
                    .and_then(|c| c.label.first().copied());
                if label_first != Some(first) {
                    return Err(IndexError::inconsistent(format!(
                        "node {} lists child {} under byte {:#04x}",
                        id, child, first
                    )));
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn push_dangling_child(&mut self, byte: u8, target: NodeId) {
        let root = &mut self.nodes[ROOT as usize];
        let slot = match root.child_slot(byte) {
            Ok(i) | Err(i) => i,
        };
        root.children.insert(slot, (byte, target));
    }
}

impl RadixTrie<PostingsList> {
    /// Record one occurrence of `token`.
    pub fn insert_posting(&mut self, token: &[u8], doc: u32, offset: u32) -> InsertCase {
        self.insert(token, Posting::new(doc, offset))
    }
}

#[inline]
fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
