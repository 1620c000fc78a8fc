// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Preorder token cursor over the flattened trie.
//!
//! Children are stored in first-byte order, so a preorder walk that emits a
//! node before its children yields tokens in lexicographic byte order. The
//! external merge relies on that.

use super::node::NodeStore;
use crate::error::Result;
use crate::trie::{NodeId, ROOT};
use crate::types::PostingsRef;

/// Yields `(token, postings)` for every node that carries postings.
pub struct TrieCursor<'s> {
    store: &'s NodeStore,
    /// `(node, length of the path above it)`, next node on top.
    stack: Vec<(NodeId, usize)>,
    path: Vec<u8>,
    failed: bool,
}

impl<'s> TrieCursor<'s> {
    pub fn new(store: &'s NodeStore) -> Self {
        Self {
            store,
            stack: vec![(ROOT, 0)],
            path: Vec::new(),
            failed: false,
        }
    }
}

impl Iterator for TrieCursor<'_> {
    type Item = Result<(Vec<u8>, PostingsRef)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while let Some((id, above)) = self.stack.pop() {
            let record = match self.store.node(id) {
                Ok(record) => record,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };
            self.path.truncate(above);
            self.path.extend_from_slice(record.label);
            let below = self.path.len();
            self.stack
                .extend(record.children().rev().map(|(_, child)| (child, below)));

            if !record.postings.is_empty() {
                return Some(Ok((self.path.clone(), record.postings)));
            }
        }
        None
    }
}
