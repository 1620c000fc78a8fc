// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Edit distance with an early-exit optimization.
//!
//! The key insight: `|len(a) - len(b)|` is a lower bound on edit distance.
//! If two strings differ in length by more than the threshold, skip the O(nm) DP.
//!
//! Distances are over bytes, the unit the trie stores. A multi-byte UTF-8
//! character therefore costs as many edits as it has differing bytes, which
//! is exactly what the trie walk counts too.

/// Bounded Levenshtein distance: `Some(d)` if `d <= max`, else `None`.
///
/// Two early-exit paths:
/// 1. If length difference exceeds `max`, return immediately
/// 2. If minimum row value exceeds `max`, abandon the DP early
pub fn levenshtein_bounded(a: &[u8], b: &[u8], max: usize) -> Option<usize> {
    // Early-exit: length difference is a lower bound on edit distance
    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let mut dp: Vec<usize> = (0..=b.len()).collect();
    for (i, &ac) in a.iter().enumerate() {
        let mut prev = dp[0];
        dp[0] = i + 1;
        let mut min_row = dp[0];

        for (j, &bc) in b.iter().enumerate() {
            let temp = dp[j + 1];
            let cost = usize::from(ac != bc);
            dp[j + 1] = (dp[j + 1] + 1).min(dp[j] + 1).min(prev + cost);
            prev = temp;
            min_row = min_row.min(dp[j + 1]);
        }

        // Early-exit: if minimum in this row exceeds max, no point continuing
        if min_row > max {
            return None;
        }
    }

    let distance = dp[b.len()];
    (distance <= max).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within(a: &[u8], b: &[u8], max: usize) -> bool {
        levenshtein_bounded(a, b, max).is_some()
    }

    #[test]
    fn test_exact_match() {
        assert!(within(b"hello", b"hello", 0));
        assert_eq!(levenshtein_bounded(b"hello", b"hello", 3), Some(0));
    }

    #[test]
    fn test_one_edit() {
        assert!(within(b"hello", b"hallo", 1));
        assert!(within(b"hello", b"hell", 1));
        assert!(within(b"hello", b"helloo", 1));
        assert!(!within(b"hello", b"hallo", 0));
    }

    #[test]
    fn test_early_exit() {
        // Length difference is 5, so distance must be >= 5
        assert!(!within(b"a", b"abcdef", 1));
    }

    #[test]
    fn test_two_edits() {
        assert_eq!(levenshtein_bounded(b"cat", b"cart", 2), Some(1));
        assert_eq!(levenshtein_bounded(b"cat", b"car", 2), Some(1));
        assert_eq!(levenshtein_bounded(b"photography", b"phptograpy", 2), Some(2));
        assert_eq!(levenshtein_bounded(b"kitten", b"sitting", 2), None);
        assert_eq!(levenshtein_bounded(b"kitten", b"sitting", 3), Some(3));
    }

    #[test]
    fn test_multibyte_counts_bytes() {
        // é is two bytes in UTF-8; e is one
        assert_eq!(
            levenshtein_bounded("cafe".as_bytes(), "café".as_bytes(), 3),
            Some(2)
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(levenshtein_bounded(b"", b"", 0), Some(0));
        assert_eq!(levenshtein_bounded(b"", b"ab", 2), Some(2));
        assert_eq!(levenshtein_bounded(b"ab", b"", 1), None);
    }
}
