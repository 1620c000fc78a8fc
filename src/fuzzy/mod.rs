// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzzy matching: typo tolerance via edit distance.
//!
//! The trie walk in `read::fuzzy` never computes a full distance matrix. This
//! module is the plain bounded Levenshtein used where candidates are already
//! laid out flat: the length-pruned token-table scan, and the tests that check
//! both paths agree.

mod levenshtein;

pub use levenshtein::*;

use crate::config::MAX_TOKEN_LEN_LIMIT;

/// Default edit budget for a query of `len` bytes: one edit per four bytes.
#[inline]
pub fn default_budget(len: usize) -> usize {
    len >> 2
}

/// Largest budget that can still change the result for a query of `len`
/// bytes. No stored token is longer than [`MAX_TOKEN_LEN_LIMIT`], and any
/// token is within `max(len, token len)` edits of the query.
#[inline]
pub fn clamp_budget(len: usize, budget: usize) -> usize {
    budget.min(MAX_TOKEN_LEN_LIMIT.saturating_add(len))
}
