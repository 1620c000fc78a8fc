//! Wildcard search against a recursive glob oracle.

use ftrie::{IndexReader, Pattern};
use proptest::prelude::*;

use crate::common::{
    brute_force_wildcard, glob_matches, reader_from_words, token_strings, word_strategy,
    VOCABULARY,
};

fn search(reader: &IndexReader, pattern: &str) -> Vec<String> {
    let pattern = Pattern::parse(pattern.as_bytes()).unwrap();
    let matches = reader.wildcard(&pattern).unwrap();
    token_strings(matches.iter().map(|m| m.token.as_slice()))
}

fn pattern_strategy() -> impl Strategy<Value = String> {
    let piece = prop::sample::select(vec![
        "a", "b", "c", "d", "e", "n", "t", ".", ".?", ".*", ".+",
    ]);
    prop::collection::vec(piece, 1..6).prop_map(|pieces| pieces.concat())
}

#[test]
fn test_fixed_vocabulary_patterns() {
    let (_dir, reader) = reader_from_words(VOCABULARY);
    for pattern in [
        "a", "an.", "an.*", "an.+", "an.?", ".", "..", ".*", ".+", "c.r.?", "ca.*g",
        ".*t", ".*a.*", "d.?o.*", "z.*a", "x.*", "ant.*a", ".n.", "c.*.*e",
    ] {
        assert_eq!(
            search(&reader, pattern),
            brute_force_wildcard(VOCABULARY, pattern),
            "pattern {pattern:?}"
        );
    }
}

#[test]
fn test_escaped_operators() {
    let words = ["a.b", "axb", "a*", "a", "ab"];
    let (_dir, reader) = reader_from_words(&words);
    assert_eq!(search(&reader, r"a\.b"), vec!["a.b"]);
    assert_eq!(search(&reader, "a.b"), vec!["a.b", "axb"]);
    assert_eq!(search(&reader, r"a\*"), vec!["a*"]);
}

#[test]
fn test_literal_pattern_is_exact_lookup() {
    let (_dir, reader) = reader_from_words(VOCABULARY);
    assert_eq!(search(&reader, "card"), vec!["card"]);
    assert!(search(&reader, "ca").is_empty());
}

#[test]
fn test_oracle_agrees_with_pattern_matcher() {
    for pattern in ["a.*b", ".+", "a.?c", r"\.x"] {
        let compiled = Pattern::parse(pattern.as_bytes()).unwrap();
        for token in ["ab", "axxb", "ac", "abc", ".x", "x", ""] {
            assert_eq!(
                compiled.matches(token.as_bytes()),
                glob_matches(pattern.as_bytes(), token.as_bytes()),
                "{pattern:?} vs {token:?}"
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_fixed_vocabulary(pattern in pattern_strategy()) {
        let (_dir, reader) = reader_from_words(VOCABULARY);
        prop_assert_eq!(search(&reader, &pattern), brute_force_wildcard(VOCABULARY, &pattern));
    }

    #[test]
    fn prop_random_vocabulary(
        words in prop::collection::vec(word_strategy(), 1..40),
        pattern in pattern_strategy(),
    ) {
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let (_dir, reader) = reader_from_words(&refs);
        prop_assert_eq!(search(&reader, &pattern), brute_force_wildcard(&refs, &pattern));
    }
}
