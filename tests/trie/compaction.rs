//! The flattened trie answers exactly what the in-memory trie would.

use ftrie::binary::write_trie;
use ftrie::types::normalize_postings;
use ftrie::{IndexReader, PostingsList, PostingsRef, TokenizerOptions};
use proptest::prelude::*;
use tempfile::TempDir;

use crate::common::{expected_postings, reader_from_triples, trie_from, triples_strategy, Triple};

fn triples(tokens: &[&str]) -> Vec<Triple> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_bytes().to_vec(), i as u32 / 2, i as u32))
        .collect()
}

/// Every token of the in-memory trie, looked up both ways on disk.
fn assert_equivalent(triples: &[Triple]) {
    let trie = trie_from(triples);
    let in_memory: Vec<(Vec<u8>, PostingsList)> = trie
        .iter()
        .map(|(token, postings)| {
            let mut postings = postings.clone();
            normalize_postings(&mut postings);
            (token, postings)
        })
        .collect();

    let dir = TempDir::new().unwrap();
    let header = write_trie(dir.path(), &TokenizerOptions::default(), trie, 1).unwrap();
    assert_eq!(header.token_count as usize, in_memory.len());

    let reader = IndexReader::open(dir.path()).unwrap();
    for (token, postings) in &in_memory {
        let via_trie = reader.lookup(token).unwrap().expect("token present");
        assert_eq!(&reader.postings(via_trie).unwrap(), postings);
        assert_eq!(reader.lookup_in_table(token), Some(via_trie));
    }
}

#[test]
fn test_single_token() {
    assert_equivalent(&triples(&["solo"]));
}

#[test]
fn test_single_byte_tokens() {
    assert_equivalent(&triples(&["a", "b", "c", "a"]));
}

#[test]
fn test_split_at_root_child() {
    // "abc" is cut right below the root by "a" and then "axe".
    assert_equivalent(&triples(&["abc", "a", "axe"]));
}

#[test]
fn test_split_at_leaf() {
    assert_equivalent(&triples(&["car", "cart", "carts", "care"]));
}

#[test]
fn test_long_tokens_at_max_length() {
    let long_a = "a".repeat(255);
    let long_b = format!("{}b", "a".repeat(254));
    assert_equivalent(&triples(&[&long_a, &long_b, "a"]));
}

#[test]
fn test_prefix_tokens_are_not_found_as_words() {
    let (_dir, reader) = reader_from_triples(&triples(&["cart", "cars"]));
    assert_eq!(reader.lookup(b"car").unwrap(), Some(PostingsRef::EMPTY));
    assert_eq!(reader.lookup_in_table(b"car"), None);
    // ends inside the "car" label
    assert_eq!(reader.lookup(b"c").unwrap(), None);
    assert_eq!(reader.lookup(b"carts").unwrap(), None);
    assert_eq!(reader.lookup(b"x").unwrap(), None);
}

#[test]
fn test_empty_trie() {
    let (_dir, reader) = reader_from_triples(&[]);
    assert_eq!(reader.header().token_count, 0);
    assert_eq!(reader.header().node_count, 1);
    assert_eq!(reader.tokens().count(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip(triples in triples_strategy()) {
        let expected = expected_postings(&triples);
        let (_dir, reader) = reader_from_triples(&triples);
        prop_assert_eq!(reader.header().token_count as usize, expected.len());
        for (token, postings) in &expected {
            let found = reader.lookup(token).unwrap().expect("token present");
            prop_assert_eq!(&reader.postings(found).unwrap(), postings);
        }
    }

    #[test]
    fn prop_cursor_lists_vocabulary_in_order(triples in triples_strategy()) {
        let expected = expected_postings(&triples);
        let (_dir, reader) = reader_from_triples(&triples);
        let listed: Vec<Vec<u8>> = reader.tokens().map(|r| r.unwrap().0).collect();
        let vocabulary: Vec<Vec<u8>> = expected.keys().cloned().collect();
        prop_assert_eq!(listed, vocabulary);
    }
}
