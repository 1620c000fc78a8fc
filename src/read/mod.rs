// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Read-only access to a finished index.
//!
//! [`IndexReader`] loads the five data files once and answers every query
//! from those bytes. It never mutates anything after `open`, holds no
//! interior mutability, and is `Send + Sync`: share it behind an `Arc` and
//! query from as many threads as you like. Each query builds its own small
//! traversal context and drops it when done.
//!
//! Two paths lead to the same postings:
//!
//! - the **trie** (`lookup`, `wildcard`, `fuzzy`, `tokens`), walked by node
//!   id and byte offset;
//! - the **token table** (`lookup_in_table`, `fuzzy_scan`), binary searched
//!   or scanned within length buckets.
//!
//! Both are written from the same vocabulary and must agree; the test suite
//! holds them to that.

mod cursor;
mod exact;
mod fuzzy;
mod node;
mod wildcard;

pub use cursor::TrieCursor;
pub use exact::ResumePoint;
pub use fuzzy::{EditCounts, FuzzyMatch};
pub use node::{NodeRecord, NodeStore};
pub use wildcard::{Atom, Pattern};

use std::path::Path;

use tracing::debug;

use crate::binary::{decode_postings, DataFile, IndexFiles, MetaHeader, TokenTable};
use crate::error::{IndexError, Result};
use crate::fuzzy::{clamp_budget, levenshtein_bounded};
use crate::types::{PostingsList, PostingsRef};

/// A token found by a wildcard query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMatch {
    pub token: Vec<u8>,
    pub postings: PostingsRef,
}

/// An open index.
#[derive(Debug, Clone)]
pub struct IndexReader {
    header: MetaHeader,
    table: TokenTable,
    postings: Vec<u8>,
    trie: NodeStore,
}

impl IndexReader {
    /// Load and validate the index in `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        let reader = Self::from_files(IndexFiles::read(dir)?)?;
        debug!(
            dir = %dir.display(),
            tokens = reader.header.token_count,
            nodes = reader.header.node_count,
            "index opened"
        );
        Ok(reader)
    }

    pub fn from_files(files: IndexFiles) -> Result<Self> {
        let IndexFiles {
            header,
            length_index,
            token_table,
            postings,
            node_sizes,
            node_data,
        } = files;

        let table = TokenTable::parse(token_table, &length_index)
            .map_err(|e| IndexError::corrupt(DataFile::LengthIndex.name(), e.to_string()))?;
        let trie = NodeStore::from_bytes(&node_sizes, node_data)?;

        if table.len() != header.token_count as usize {
            return Err(IndexError::corrupt(
                DataFile::TokenTable.name(),
                format!(
                    "{} records, header says {}",
                    table.len(),
                    header.token_count
                ),
            ));
        }
        if trie.len() != header.node_count as usize {
            return Err(IndexError::corrupt(
                DataFile::NodeSizes.name(),
                format!("{} nodes, header says {}", trie.len(), header.node_count),
            ));
        }

        Ok(Self {
            header,
            table,
            postings,
            trie,
        })
    }

    pub fn header(&self) -> &MetaHeader {
        &self.header
    }

    pub fn trie(&self) -> &NodeStore {
        &self.trie
    }

    pub fn table(&self) -> &TokenTable {
        &self.table
    }

    /// Size of the postings blob in bytes.
    pub fn postings_len(&self) -> usize {
        self.postings.len()
    }

    /// Decode the postings run behind `postings`.
    pub fn postings(&self, postings: PostingsRef) -> Result<PostingsList> {
        if postings.is_empty() {
            return Ok(Vec::new());
        }
        let file = DataFile::Postings.name();
        let start = usize::try_from(postings.pointer)
            .ok()
            .filter(|&p| p < self.postings.len())
            .ok_or_else(|| {
                IndexError::corrupt(
                    file,
                    format!(
                        "pointer {} past end of {}-byte blob",
                        postings.pointer,
                        self.postings.len()
                    ),
                )
            })?;
        let (list, _) = decode_postings(&self.postings[start..], postings.count)
            .map_err(|e| IndexError::corrupt(file, format!("run at {}: {}", start, e)))?;
        Ok(list)
    }

    /// Exact lookup through the trie.
    ///
    /// `Some(EMPTY)` means the token ends at an internal node: a prefix of
    /// indexed tokens but not indexed itself.
    pub fn lookup(&self, token: &[u8]) -> Result<Option<PostingsRef>> {
        self.trie.lookup(token)
    }

    /// Exact lookup through the length index and token table.
    pub fn lookup_in_table(&self, token: &[u8]) -> Option<PostingsRef> {
        self.table.find(token)
    }

    /// Tokens matching a wildcard pattern, via the trie.
    pub fn wildcard(&self, pattern: &Pattern) -> Result<Vec<TermMatch>> {
        self.trie.wildcard(pattern)
    }

    /// Tokens within `budget` edits of `query`, via the trie.
    pub fn fuzzy(&self, query: &[u8], budget: usize) -> Result<Vec<FuzzyMatch>> {
        self.trie.fuzzy(query, budget)
    }

    /// Tokens within `budget` edits of `query`, via a scan of the token-table
    /// buckets whose length is within `budget` of the query's.
    pub fn fuzzy_scan(&self, query: &[u8], budget: usize) -> Vec<(Vec<u8>, PostingsRef, usize)> {
        let budget = clamp_budget(query.len(), budget);
        let lengths = query.len().saturating_sub(budget)..=query.len().saturating_add(budget);
        let mut out: Vec<(Vec<u8>, PostingsRef, usize)> = self
            .table
            .entries_in(lengths)
            .filter_map(|(token, postings)| {
                levenshtein_bounded(query, token, budget).map(|d| (token.to_vec(), postings, d))
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Every `(token, postings)` in lexicographic byte order.
    pub fn tokens(&self) -> TrieCursor<'_> {
        TrieCursor::new(&self.trie)
    }

    /// Release the loaded files.
    pub fn close(self) {
        debug!(tokens = self.header.token_count, "index closed");
    }
}
