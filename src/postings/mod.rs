// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Pull-based postings cursors and the combinators that compose them.
//!
//! A cursor produces one [`Hit`] per document, in ascending doc order. Each
//! hit carries the spans that matched inside that document. A single token
//! contributes one-position spans; phrase intersection widens them.
//!
//! ```text
//!   ListCursor("new") ──┐
//!                       ├─ Intersect(w=1) ──┐
//!   ListCursor("york") ─┘                   ├─ Union ──► hits
//!   ListCursor("nyc") ──────────────────────┘
//! ```
//!
//! The contract is the classic two-call one: `advance()` moves to the next
//! document and says whether there is one, `current()` shows it. Calling
//! `current()` before the first successful `advance()` is a logic error;
//! cursors return an empty hit rather than panic.

mod intersect;
mod union;

pub use intersect::Intersect;
pub use union::{MultiUnion, Union};

use crate::types::{Hit, Posting, PostingsList, Span};

/// A sorted stream of per-document hits.
pub trait PostingsCursor {
    /// Move to the next document. False once exhausted.
    fn advance(&mut self) -> bool;

    /// The hit the cursor is on.
    fn current(&self) -> &Hit;
}

impl<C: PostingsCursor + ?Sized> PostingsCursor for Box<C> {
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn current(&self) -> &Hit {
        (**self).current()
    }
}

/// Drain a cursor into a vector.
pub fn collect_hits<C: PostingsCursor>(mut cursor: C) -> Vec<Hit> {
    let mut hits = Vec::new();
    while cursor.advance() {
        hits.push(cursor.current().clone());
    }
    hits
}

/// Drain a cursor into flat postings, one per span start.
pub fn collect_postings<C: PostingsCursor>(cursor: C) -> PostingsList {
    collect_hits(cursor)
        .iter()
        .flat_map(|hit| hit.postings().collect::<Vec<Posting>>())
        .collect()
}

/// Cursor over a decoded postings list.
#[derive(Debug, Clone, Default)]
pub struct ListCursor {
    postings: PostingsList,
    next: usize,
    current: Hit,
}

impl ListCursor {
    /// `postings` must be sorted by `(doc, offset)`.
    pub fn new(postings: PostingsList) -> Self {
        debug_assert!(postings.windows(2).all(|w| w[0] <= w[1]));
        Self {
            postings,
            next: 0,
            current: Hit::default(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl PostingsCursor for ListCursor {
    fn advance(&mut self) -> bool {
        let Some(first) = self.postings.get(self.next) else {
            return false;
        };
        let doc = first.doc;
        self.current.doc = doc;
        self.current.spans.clear();
        while let Some(p) = self.postings.get(self.next).filter(|p| p.doc == doc) {
            let span = Span::at(p.offset);
            if self.current.spans.last() != Some(&span) {
                self.current.spans.push(span);
            }
            self.next += 1;
        }
        true
    }

    fn current(&self) -> &Hit {
        &self.current
    }
}

/// Merge two sorted span lists, dropping duplicates.
pub(crate) fn merge_spans(a: &[Span], b: &[Span]) -> Vec<Span> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let next = if a[i] <= b[j] {
            i += 1;
            a[i - 1]
        } else {
            j += 1;
            b[j - 1]
        };
        if out.last() != Some(&next) {
            out.push(next);
        }
    }
    for &span in a[i..].iter().chain(&b[j..]) {
        if out.last() != Some(&span) {
            out.push(span);
        }
    }
    out
}
