// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks shared by the builder, the on-disk layout and the
//! query cursors.
//!
//! # Invariants
//!
//! - **Posting**: ordered by `(doc, offset)`. Within one build pass `doc`
//!   never decreases. `offset` is the ordinal token position inside the
//!   document, so two adjacent words have offsets differing by exactly one.
//!
//! - **PostingsList**: sorted, no duplicate `(doc, offset)` pairs. Merging
//!   sources may produce duplicates transiently; [`normalize_postings`]
//!   is the one place that collapses them.
//!
//! - **PostingsRef**: `pointer` is a byte offset into the postings blob and
//!   must fit in 40 bits; `count` is the number of postings in the run.

use serde::{Deserialize, Serialize};

/// Externally assigned document-node identifier.
pub type DocId = u32;

/// One occurrence of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Posting {
    pub doc: DocId,
    pub offset: u32,
}

impl Posting {
    #[inline]
    pub const fn new(doc: DocId, offset: u32) -> Self {
        Self { doc, offset }
    }
}

impl From<(u32, u32)> for Posting {
    fn from((doc, offset): (u32, u32)) -> Self {
        Posting { doc, offset }
    }
}

/// All occurrences of one token, sorted by `(doc, offset)`.
pub type PostingsList = Vec<Posting>;

/// Sort and deduplicate postings in place.
///
/// Cheap when the input is already sorted, which is the common case: the
/// builder sees documents in order and tokens in order within a document.
pub fn normalize_postings(postings: &mut PostingsList) {
    if !postings.windows(2).all(|w| w[0] < w[1]) {
        postings.sort_unstable();
        postings.dedup();
    }
}

/// Location of one token's postings run inside the postings blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PostingsRef {
    pub pointer: u64,
    pub count: u32,
}

impl PostingsRef {
    /// Largest pointer the 5-byte on-disk field can hold.
    pub const MAX_POINTER: u64 = (1 << 40) - 1;

    pub const EMPTY: PostingsRef = PostingsRef {
        pointer: 0,
        count: 0,
    };

    #[inline]
    pub fn is_empty(self) -> bool {
        self.count == 0
    }
}

/// A matched stretch of token positions inside one document.
///
/// A single token match has `start == end`. Phrase and proximity
/// intersections widen the span to cover both operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn at(offset: u32) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }
}

/// One document produced by a postings cursor, with every match in it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Hit {
    pub doc: DocId,
    /// Sorted, deduplicated.
    pub spans: Vec<Span>,
}

impl Hit {
    /// Flatten back into postings, one per span start.
    pub fn postings(&self) -> impl Iterator<Item = Posting> + '_ {
        self.spans.iter().map(move |s| Posting::new(self.doc, s.start))
    }
}
