// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Exact lookup: one walk from the root, comparing labels byte by byte.

use super::node::NodeStore;
use crate::error::Result;
use crate::trie::NodeId;
use crate::types::PostingsRef;

/// Where a literal byte string ends inside the trie.
///
/// The string may end part-way through a label; `label_pos` says how many
/// bytes of that label it covered, `matched` how many bytes it covered in
/// total. Wildcard search resumes from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    pub node: NodeId,
    pub label_pos: usize,
    pub label_len: usize,
    pub matched: usize,
    pub postings: PostingsRef,
}

impl ResumePoint {
    /// True when the string ended exactly at the end of the node's label.
    #[inline]
    pub fn at_boundary(&self) -> bool {
        self.label_pos == self.label_len
    }
}

impl NodeStore {
    /// Follow `prefix` from the root.
    ///
    /// Returns `None` as soon as a byte has no continuation.
    pub fn descend(&self, prefix: &[u8]) -> Result<Option<ResumePoint>> {
        let mut record = self.root()?;
        let mut matched = 0usize;

        loop {
            let Some(&next) = prefix.get(matched) else {
                return Ok(Some(ResumePoint {
                    node: record.id,
                    label_pos: record.label.len(),
                    label_len: record.label.len(),
                    matched,
                    postings: record.postings,
                }));
            };
            let Some(child) = record.find_child(next) else {
                return Ok(None);
            };
            record = self.node(child)?;

            let rest = &prefix[matched..];
            let common = record
                .label
                .iter()
                .zip(rest)
                .take_while(|(a, b)| a == b)
                .count();

            if common < record.label.len() {
                // Either the prefix ends inside this label or it diverges.
                return Ok((common == rest.len() && common > 0).then_some(ResumePoint {
                    node: record.id,
                    label_pos: common,
                    label_len: record.label.len(),
                    matched: matched + common,
                    postings: record.postings,
                }));
            }
            matched += common;
        }
    }

    /// Postings reference of `token`.
    ///
    /// A token that ends exactly at an internal node yields that node's
    /// (empty) reference; any mismatch yields `None`.
    pub fn lookup(&self, token: &[u8]) -> Result<Option<PostingsRef>> {
        Ok(self
            .descend(token)?
            .filter(ResumePoint::at_boundary)
            .map(|rp| rp.postings))
    }
}
