// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Build progress callbacks.
//!
//! The builder never prints. It reports through this trait, and the caller
//! decides whether that means a progress bar, a log line, or nothing.

use super::BuildSummary;

/// Receives progress events from [`IndexBuilder`](super::IndexBuilder).
///
/// Every method has an empty default, implement only what you need.
pub trait BuildObserver {
    /// `documents` texts have been tokenized so far.
    fn documents_indexed(&mut self, _documents: u64) {}

    /// Partial index number `number` was written with `tokens` tokens.
    fn partial_flushed(&mut self, _number: usize, _tokens: u32) {}

    /// The k-way merge is about to start over `partials` partial indexes
    /// holding `tokens` tokens between them (duplicates counted once each).
    fn merge_started(&mut self, _partials: usize, _tokens: u64) {}

    /// `done` of `total` partial tokens have been merged.
    fn merge_progress(&mut self, _done: u64, _total: u64) {}

    fn finished(&mut self, _summary: &BuildSummary) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}

impl<T: BuildObserver + ?Sized> BuildObserver for &mut T {
    fn documents_indexed(&mut self, documents: u64) {
        (**self).documents_indexed(documents)
    }

    fn partial_flushed(&mut self, number: usize, tokens: u32) {
        (**self).partial_flushed(number, tokens)
    }

    fn merge_started(&mut self, partials: usize, tokens: u64) {
        (**self).merge_started(partials, tokens)
    }

    fn merge_progress(&mut self, done: u64, total: u64) {
        (**self).merge_progress(done, total)
    }

    fn finished(&mut self, summary: &BuildSummary) {
        (**self).finished(summary)
    }
}
