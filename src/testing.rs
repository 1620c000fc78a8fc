// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical implementations of test helpers to avoid duplication.

#![doc(hidden)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::build::{BuildObserver, BuildSummary};
use crate::trie::RadixTrie;
use crate::types::{normalize_postings, Posting, PostingsList};

/// A `(token, doc, offset)` triple.
pub type Triple = (Vec<u8>, u32, u32);

/// Insert every triple into a fresh trie.
pub fn trie_from(triples: &[Triple]) -> RadixTrie<PostingsList> {
    let mut trie = RadixTrie::new();
    for (token, doc, offset) in triples {
        trie.insert_posting(token, *doc, *offset);
    }
    trie
}

/// What a lookup of each distinct token must return: sorted, no duplicates.
pub fn expected_postings(triples: &[Triple]) -> BTreeMap<Vec<u8>, PostingsList> {
    let mut expected: BTreeMap<Vec<u8>, PostingsList> = BTreeMap::new();
    for (token, doc, offset) in triples {
        expected
            .entry(token.clone())
            .or_default()
            .push(Posting::new(*doc, *offset));
    }
    for postings in expected.values_mut() {
        normalize_postings(postings);
    }
    expected
}

/// Tiny fixed vocabulary with shared prefixes at several depths.
pub const VOCABULARY: &[&str] = &[
    "a", "an", "and", "ant", "antenna", "car", "card", "care", "cart", "cat", "catalog",
    "dog", "dot", "door", "zebra",
];

/// One event seen by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    Documents(u64),
    PartialFlushed { number: usize, tokens: u32 },
    MergeStarted { partials: usize, tokens: u64 },
    MergeProgress { done: u64, total: u64 },
    Finished { tokens: u32 },
}

/// Records every build event in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<BuildEvent>,
}

impl RecordingObserver {
    pub fn flushes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BuildEvent::PartialFlushed { .. }))
            .count()
    }
}

impl BuildObserver for RecordingObserver {
    fn documents_indexed(&mut self, documents: u64) {
        self.events.push(BuildEvent::Documents(documents));
    }

    fn partial_flushed(&mut self, number: usize, tokens: u32) {
        self.events.push(BuildEvent::PartialFlushed { number, tokens });
    }

    fn merge_started(&mut self, partials: usize, tokens: u64) {
        self.events.push(BuildEvent::MergeStarted { partials, tokens });
    }

    fn merge_progress(&mut self, done: u64, total: u64) {
        self.events.push(BuildEvent::MergeProgress { done, total });
    }

    fn finished(&mut self, summary: &BuildSummary) {
        self.events.push(BuildEvent::Finished {
            tokens: summary.token_count,
        });
    }
}

/// Raises a cancellation flag at a chosen point of the build.
pub struct CancelAt<'a> {
    flag: &'a AtomicBool,
    point: CancelPoint,
}

#[derive(Debug, Clone, Copy)]
pub enum CancelPoint {
    /// Once this many documents have been indexed.
    Documents(u64),
    /// When the merge starts.
    Merge,
}

impl<'a> CancelAt<'a> {
    pub fn new(flag: &'a AtomicBool, point: CancelPoint) -> Self {
        Self { flag, point }
    }
}

impl BuildObserver for CancelAt<'_> {
    fn documents_indexed(&mut self, documents: u64) {
        if let CancelPoint::Documents(n) = self.point {
            if documents >= n {
                self.flag.store(true, Ordering::Relaxed);
            }
        }
    }

    fn merge_started(&mut self, _partials: usize, _tokens: u64) {
        if let CancelPoint::Merge = self.point {
            self.flag.store(true, Ordering::Relaxed);
        }
    }
}
