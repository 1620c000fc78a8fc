// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Union: every document either side produced, matches merged.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::{merge_spans, PostingsCursor};
use crate::types::Hit;

/// Two-way union by doc id. Equal docs come out once, with their spans
/// merged and deduplicated.
pub struct Union<L, R> {
    left: L,
    right: R,
    primed: bool,
    left_live: bool,
    right_live: bool,
    current: Hit,
}

impl<L: PostingsCursor, R: PostingsCursor> Union<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self {
            left,
            right,
            primed: false,
            left_live: false,
            right_live: false,
            current: Hit::default(),
        }
    }
}

impl<L: PostingsCursor, R: PostingsCursor> PostingsCursor for Union<L, R> {
    fn advance(&mut self) -> bool {
        if !self.primed {
            self.left_live = self.left.advance();
            self.right_live = self.right.advance();
            self.primed = true;
        }

        let order = match (self.left_live, self.right_live) {
            (false, false) => return false,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => self.left.current().doc.cmp(&self.right.current().doc),
        };

        match order {
            Ordering::Less => {
                self.current.clone_from(self.left.current());
                self.left_live = self.left.advance();
            }
            Ordering::Greater => {
                self.current.clone_from(self.right.current());
                self.right_live = self.right.advance();
            }
            Ordering::Equal => {
                let (l, r) = (self.left.current(), self.right.current());
                self.current = Hit {
                    doc: l.doc,
                    spans: merge_spans(&l.spans, &r.spans),
                };
                self.left_live = self.left.advance();
                self.right_live = self.right.advance();
            }
        }
        true
    }

    fn current(&self) -> &Hit {
        &self.current
    }
}

/// k-way union over any number of cursors, driven by a min-heap on doc id.
pub struct MultiUnion<C> {
    cursors: Vec<C>,
    /// `(doc, cursor index)` of every live cursor.
    heap: BinaryHeap<Reverse<(u32, usize)>>,
    primed: bool,
    current: Hit,
}

impl<C: PostingsCursor> MultiUnion<C> {
    pub fn new(cursors: Vec<C>) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(cursors.len()),
            cursors,
            primed: false,
            current: Hit::default(),
        }
    }
}

impl<C: PostingsCursor> PostingsCursor for MultiUnion<C> {
    fn advance(&mut self) -> bool {
        if !self.primed {
            for (i, cursor) in self.cursors.iter_mut().enumerate() {
                if cursor.advance() {
                    self.heap.push(Reverse((cursor.current().doc, i)));
                }
            }
            self.primed = true;
        }

        let Some(Reverse((doc, first))) = self.heap.pop() else {
            return false;
        };
        let mut ready = vec![first];
        while let Some(&Reverse((next_doc, i))) = self.heap.peek() {
            if next_doc != doc {
                break;
            }
            self.heap.pop();
            ready.push(i);
        }

        self.current.doc = doc;
        self.current.spans.clear();
        for i in ready {
            let cursor = &mut self.cursors[i];
            self.current.spans = merge_spans(&self.current.spans, &cursor.current().spans);
            if cursor.advance() {
                self.heap.push(Reverse((cursor.current().doc, i)));
            }
        }
        true
    }

    fn current(&self) -> &Hit {
        &self.current
    }
}
