//! A memory ceiling changes how an index is built, never what it answers.

use std::collections::BTreeMap;

use ftrie::{IndexConfig, IndexReader, PostingsList};
use proptest::prelude::*;
use tempfile::TempDir;

use crate::common::{build, corpus_strategy};

/// Every token of the index with its decoded postings.
fn contents(reader: &IndexReader) -> BTreeMap<Vec<u8>, PostingsList> {
    reader
        .tokens()
        .map(|entry| {
            let (token, postings) = entry.unwrap();
            (token, reader.postings(postings).unwrap())
        })
        .collect()
}

fn build_both(docs: &[(u32, String)], memory_limit: usize) -> (usize, IndexReader, IndexReader) {
    let unbounded = TempDir::new().unwrap();
    let bounded = TempDir::new().unwrap();
    build(unbounded.path(), IndexConfig::default(), docs);
    let summary = build(
        bounded.path(),
        IndexConfig::default().with_memory_limit(memory_limit),
        docs,
    );
    (
        summary.partials,
        IndexReader::open(unbounded.path()).unwrap(),
        IndexReader::open(bounded.path()).unwrap(),
    )
}

fn sample_corpus() -> Vec<(u32, String)> {
    let words = ["lorem", "ipsum", "dolor", "sit", "amet", "lore", "dolorem", "a"];
    (0..120u32)
        .map(|i| {
            let text: Vec<&str> = (0..(i % 7 + 1))
                .map(|j| words[((i * 31 + j * 17) % words.len() as u32) as usize])
                .collect();
            (i / 2, text.join(" "))
        })
        .collect()
}

#[test]
fn test_many_partials_merge_to_same_answers() {
    let docs = sample_corpus();
    let (partials, unbounded, bounded) = build_both(&docs, 1024);
    assert!(partials > 1, "expected several partial flushes, got {partials}");

    assert_eq!(contents(&unbounded), contents(&bounded));
    assert_eq!(unbounded.header().token_count, bounded.header().token_count);
    assert_eq!(unbounded.header().node_count, bounded.header().node_count);
    assert_eq!(unbounded.header().posting_count, bounded.header().posting_count);
    assert_eq!(unbounded.header().doc_count, bounded.header().doc_count);
}

#[test]
fn test_merged_table_agrees_with_merged_trie() {
    let docs = sample_corpus();
    let (_, _, bounded) = build_both(&docs, 1);
    for entry in bounded.tokens() {
        let (token, postings) = entry.unwrap();
        assert_eq!(bounded.lookup_in_table(&token), Some(postings));
        assert_eq!(bounded.lookup(&token).unwrap(), Some(postings));
    }
}

#[test]
fn test_merged_queries_match() {
    let docs = sample_corpus();
    let (_, unbounded, bounded) = build_both(&docs, 512);
    let pattern = ftrie::Pattern::parse(b"lo.*").unwrap();
    let names = |r: &IndexReader| -> Vec<Vec<u8>> {
        r.wildcard(&pattern).unwrap().into_iter().map(|m| m.token).collect()
    };
    assert_eq!(names(&unbounded), vec![b"lore".to_vec(), b"lorem".to_vec()]);
    assert_eq!(names(&unbounded), names(&bounded));

    let fuzzy = |r: &IndexReader| -> Vec<(Vec<u8>, usize)> {
        r.fuzzy(b"dolor", 2)
            .unwrap()
            .into_iter()
            .map(|m| {
                let d = m.distance();
                (m.token, d)
            })
            .collect()
    };
    assert_eq!(fuzzy(&unbounded), fuzzy(&bounded));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_external_merge_equivalence(docs in corpus_strategy(), limit in 1usize..4096) {
        let (_, unbounded, bounded) = build_both(&docs, limit);
        prop_assert_eq!(contents(&unbounded), contents(&bounded));
        prop_assert_eq!(unbounded.header().doc_count, bounded.header().doc_count);
    }
}
