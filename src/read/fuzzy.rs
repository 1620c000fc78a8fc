// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded edit-distance search over the flattened trie.
//!
//! The walk carries a position in the trie (node + bytes of its label
//! consumed), a position in the query, and the edits spent so far. From
//! every state it first tries the free move, the next trie byte equal to
//! the next query byte. While budget remains it also branches into:
//!
//! - **delete**: drop one query byte, stay put in the trie;
//! - **paste**: consume one trie byte the query doesn't have;
//! - **replace**: consume one trie byte in place of a different query byte.
//!
//! A token is collected when the query and a node's label run out together.
//! The same `(node, label position, query position)` can be reached along
//! many paths; a memo of the cheapest arrival so far prunes every later
//! arrival that isn't cheaper, which keeps the walk polynomial and still
//! finds the minimal distance for every token.

use std::collections::HashMap;

use super::node::{NodeRecord, NodeStore};
use crate::error::{IndexError, Result};
use crate::fuzzy::clamp_budget;
use crate::trie::NodeId;
use crate::types::PostingsRef;

/// Edits spent along one path, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditCounts {
    pub deletes: usize,
    pub pastes: usize,
    pub replaces: usize,
}

impl EditCounts {
    #[inline]
    pub fn total(&self) -> usize {
        self.deletes + self.pastes + self.replaces
    }

    fn delete(self) -> Self {
        Self {
            deletes: self.deletes + 1,
            ..self
        }
    }

    fn paste(self) -> Self {
        Self {
            pastes: self.pastes + 1,
            ..self
        }
    }

    fn replace(self) -> Self {
        Self {
            replaces: self.replaces + 1,
            ..self
        }
    }
}

/// A token within the edit budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub token: Vec<u8>,
    pub postings: PostingsRef,
    /// Edits along the cheapest path found; `edits.total()` is the distance.
    pub edits: EditCounts,
}

impl FuzzyMatch {
    #[inline]
    pub fn distance(&self) -> usize {
        self.edits.total()
    }
}

/// Call-scoped search state.
struct FuzzyWalk<'s> {
    store: &'s NodeStore,
    query: &'s [u8],
    budget: usize,
    path: Vec<u8>,
    cheapest: HashMap<(NodeId, u32, u32), usize>,
    found: HashMap<NodeId, FuzzyMatch>,
}

impl NodeStore {
    /// Every token within `budget` edits of `query`, in lexicographic order.
    pub fn fuzzy(&self, query: &[u8], budget: usize) -> Result<Vec<FuzzyMatch>> {
        let budget = clamp_budget(query.len(), budget);
        let mut walk = FuzzyWalk {
            store: self,
            query,
            budget,
            path: Vec::with_capacity(query.len().saturating_add(budget)),
            cheapest: HashMap::new(),
            found: HashMap::new(),
        };
        let root = self.root()?;
        walk.step(&root, 0, 0, EditCounts::default())?;

        let mut out: Vec<FuzzyMatch> = walk.found.into_values().collect();
        out.sort_by(|a, b| a.token.cmp(&b.token));
        Ok(out)
    }
}

impl<'s> FuzzyWalk<'s> {
    fn step(
        &mut self,
        record: &NodeRecord<'s>,
        pos: usize,
        qpos: usize,
        edits: EditCounts,
    ) -> Result<()> {
        let key = (record.id, pos as u32, qpos as u32);
        match self.cheapest.get(&key) {
            Some(&seen) if seen <= edits.total() => return Ok(()),
            _ => {
                self.cheapest.insert(key, edits.total());
            }
        }

        let label_done = pos == record.label.len();
        let query_done = qpos == self.query.len();
        if label_done && query_done {
            self.collect(record, edits);
        }

        // Free move first.
        if let Some(&want) = self.query.get(qpos) {
            if !label_done {
                if record.label[pos] == want {
                    self.path.push(want);
                    let result = self.step(record, pos + 1, qpos + 1, edits);
                    self.path.pop();
                    result?;
                }
            } else if let Some(child) = record.find_child(want) {
                let child = self.enter(child, want)?;
                self.path.push(want);
                let result = self.step(&child, 1, qpos + 1, edits);
                self.path.pop();
                result?;
            }
        }

        if edits.total() >= self.budget {
            return Ok(());
        }

        if !query_done {
            self.step(record, pos, qpos + 1, edits.delete())?;
        }

        for (next, next_pos, byte) in self.successors(record, pos)? {
            self.path.push(byte);
            let mut result = self.step(&next, next_pos, qpos, edits.paste());
            if result.is_ok() && self.query.get(qpos).is_some_and(|&q| q != byte) {
                result = self.step(&next, next_pos, qpos + 1, edits.replace());
            }
            self.path.pop();
            result?;
        }
        Ok(())
    }

    /// Every position one trie byte further on, with that byte.
    fn successors(
        &self,
        record: &NodeRecord<'s>,
        pos: usize,
    ) -> Result<Vec<(NodeRecord<'s>, usize, u8)>> {
        if let Some(&byte) = record.label.get(pos) {
            return Ok(vec![(*record, pos + 1, byte)]);
        }
        record
            .children()
            .map(|(first, id)| Ok((self.enter(id, first)?, 1, first)))
            .collect()
    }

    fn enter(&self, child: NodeId, first: u8) -> Result<NodeRecord<'s>> {
        let store: &'s NodeStore = self.store;
        let record = store.node(child)?;
        if record.label.first() != Some(&first) {
            return Err(IndexError::corrupt(
                "ftx.node",
                format!("child {} listed under byte {:#04x}", child, first),
            ));
        }
        Ok(record)
    }

    fn collect(&mut self, record: &NodeRecord<'s>, edits: EditCounts) {
        if record.postings.is_empty() {
            return;
        }
        let better = self
            .found
            .get(&record.id)
            .map_or(true, |m| edits.total() < m.distance());
        if better {
            self.found.insert(
                record.id,
                FuzzyMatch {
                    token: self.path.clone(),
                    postings: record.postings,
                    edits,
                },
            );
        }
    }
}
