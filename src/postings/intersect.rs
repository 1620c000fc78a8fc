// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Position-aware intersection.
//!
//! `Intersect::new(left, right, w)` keeps a document only if some left span
//! ends exactly `w` positions before some right span starts. With `w = 1`
//! that's adjacency, which is how phrases are built up one token at a time:
//!
//! ```text
//!   "new" @ 4     "york" @ 5      ──►  span 4..5
//!   "new" @ 4     "york" @ 9      ──►  (no pair at distance 1)
//! ```
//!
//! The emitted hit carries only the combined spans of qualifying pairs,
//! never the raw positions of either side.

use std::cmp::Ordering;

use super::PostingsCursor;
use crate::types::{Hit, Span};

/// Doc-lockstep intersection at a fixed position distance.
pub struct Intersect<L, R> {
    left: L,
    right: R,
    distance: u32,
    primed: bool,
    left_live: bool,
    right_live: bool,
    current: Hit,
}

impl<L: PostingsCursor, R: PostingsCursor> Intersect<L, R> {
    pub fn new(left: L, right: R, distance: u32) -> Self {
        Self {
            left,
            right,
            distance,
            primed: false,
            left_live: false,
            right_live: false,
            current: Hit::default(),
        }
    }

    /// Spans where a right span starts exactly `distance` after a left one
    /// ends. Both inputs are sorted, so is the output.
    fn pair_spans(&self, left: &[Span], right: &[Span]) -> Vec<Span> {
        let mut out = Vec::new();
        for l in left {
            let Some(target) = l.end.checked_add(self.distance) else {
                continue;
            };
            let from = right.partition_point(|r| r.start < target);
            for r in right[from..].iter().take_while(|r| r.start == target) {
                out.push(Span {
                    start: l.start,
                    end: r.end,
                });
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

impl<L: PostingsCursor, R: PostingsCursor> PostingsCursor for Intersect<L, R> {
    fn advance(&mut self) -> bool {
        if !self.primed {
            self.left_live = self.left.advance();
            self.right_live = self.right.advance();
            self.primed = true;
        }

        while self.left_live && self.right_live {
            let (l, r) = (self.left.current(), self.right.current());
            match l.doc.cmp(&r.doc) {
                Ordering::Less => self.left_live = self.left.advance(),
                Ordering::Greater => self.right_live = self.right.advance(),
                Ordering::Equal => {
                    let doc = l.doc;
                    let spans = self.pair_spans(&l.spans, &r.spans);
                    self.left_live = self.left.advance();
                    self.right_live = self.right.advance();
                    if !spans.is_empty() {
                        self.current = Hit { doc, spans };
                        return true;
                    }
                }
            }
        }
        false
    }

    fn current(&self) -> &Hit {
        &self.current
    }
}
