//! Fuzzy search against `strsim`, through both index paths.

use ftrie::IndexReader;
use proptest::prelude::*;

use crate::common::{brute_force_fuzzy, reader_from_words, token_strings, word_strategy, VOCABULARY};

fn via_trie(reader: &IndexReader, query: &str, k: usize) -> Vec<String> {
    let matches = reader.fuzzy(query.as_bytes(), k).unwrap();
    for m in &matches {
        let token = String::from_utf8_lossy(&m.token).into_owned();
        assert_eq!(m.distance(), strsim::levenshtein(&token, query), "{token:?}");
    }
    token_strings(matches.iter().map(|m| m.token.as_slice()))
}

fn via_table(reader: &IndexReader, query: &str, k: usize) -> Vec<String> {
    let matches = reader.fuzzy_scan(query.as_bytes(), k);
    token_strings(matches.iter().map(|(token, _, _)| token.as_slice()))
}

#[test]
fn test_fixed_vocabulary() {
    let (_dir, reader) = reader_from_words(VOCABULARY);
    for query in ["cat", "cart", "ant", "dog", "door", "zebra", "an", "x", "catalogue"] {
        for k in 0..=3 {
            let expected = brute_force_fuzzy(VOCABULARY, query, k);
            assert_eq!(via_trie(&reader, query, k), expected, "{query:?} k={k}");
            assert_eq!(via_table(&reader, query, k), expected, "{query:?} k={k}");
        }
    }
}

#[test]
fn test_budget_larger_than_tokens() {
    let (_dir, reader) = reader_from_words(&["a", "bb", "ccc"]);
    assert_eq!(via_trie(&reader, "z", 3), vec!["a", "bb", "ccc"]);
    assert_eq!(via_table(&reader, "z", 3), vec!["a", "bb", "ccc"]);
}

#[test]
fn test_edit_counts_describe_the_path() {
    let (_dir, reader) = reader_from_words(&["cart", "at", "cut"]);
    let matches = reader.fuzzy(b"cat", 1).unwrap();
    let by_token = |t: &[u8]| matches.iter().find(|m| m.token == t).unwrap().edits;

    let cart = by_token(b"cart");
    assert_eq!(cart.total(), 1);
    let at = by_token(b"at");
    assert_eq!(at.total(), 1);
    let cut = by_token(b"cut");
    assert_eq!(cut.replaces, 1);
    assert_eq!(cut.total(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn prop_trie_matches_levenshtein(
        words in prop::collection::vec(word_strategy(), 1..40),
        query in word_strategy(),
        k in 0usize..3,
    ) {
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let (_dir, reader) = reader_from_words(&refs);
        let expected = brute_force_fuzzy(&refs, &query, k);
        prop_assert_eq!(via_trie(&reader, &query, k), expected.clone());
        prop_assert_eq!(via_table(&reader, &query, k), expected);
    }
}
