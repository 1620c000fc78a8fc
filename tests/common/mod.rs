//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;

use ftrie::binary::write_trie;
use ftrie::{BuildOutcome, BuildSummary, DocId, Index, IndexConfig, IndexReader, TokenizerOptions};
use proptest::prelude::*;
use tempfile::TempDir;

pub use ftrie::testing::{expected_postings, trie_from, Triple, VOCABULARY};

// ============================================================================
// BUILDERS
// ============================================================================

/// Write `triples` straight through the compactor and open the result.
pub fn reader_from_triples(triples: &[Triple]) -> (TempDir, IndexReader) {
    let dir = TempDir::new().unwrap();
    let docs: BTreeSet<u32> = triples.iter().map(|t| t.1).collect();
    write_trie(
        dir.path(),
        &TokenizerOptions::default(),
        trie_from(triples),
        docs.len() as u32,
    )
    .unwrap();
    let reader = IndexReader::open(dir.path()).unwrap();
    (dir, reader)
}

/// One posting per word, doc id = position in the list.
pub fn reader_from_words(words: &[&str]) -> (TempDir, IndexReader) {
    let triples: Vec<Triple> = words
        .iter()
        .enumerate()
        .map(|(i, w)| (w.as_bytes().to_vec(), i as u32, 0))
        .collect();
    reader_from_triples(&triples)
}

/// Build from text documents and insist the build completed.
pub fn build(dir: &Path, config: IndexConfig, docs: &[(DocId, String)]) -> BuildSummary {
    let docs = docs.iter().map(|(id, text)| (*id, text.as_str()));
    match Index::build(dir, config, docs).unwrap() {
        BuildOutcome::Completed(summary) => summary,
        BuildOutcome::Cancelled => panic!("build was not supposed to be cancelled"),
    }
}

/// Names of the regular files and directories directly inside `dir`.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

// ============================================================================
// ORACLES
// ============================================================================

/// Glob matcher written independently of the crate's pattern engine:
/// plain recursion over pattern text, `\` escapes, `.`, `.?`, `.*`, `.+`.
pub fn glob_matches(pattern: &[u8], token: &[u8]) -> bool {
    match pattern {
        [] => token.is_empty(),
        [b'\\', c, rest @ ..] => token.first() == Some(c) && glob_matches(rest, &token[1..]),
        [b'.', b'*', rest @ ..] => (0..=token.len()).any(|i| glob_matches(rest, &token[i..])),
        [b'.', b'+', rest @ ..] => (1..=token.len()).any(|i| glob_matches(rest, &token[i..])),
        [b'.', b'?', rest @ ..] => {
            glob_matches(rest, token) || (!token.is_empty() && glob_matches(rest, &token[1..]))
        }
        [b'.', rest @ ..] => !token.is_empty() && glob_matches(rest, &token[1..]),
        [c, rest @ ..] => token.first() == Some(c) && glob_matches(rest, &token[1..]),
    }
}

/// Vocabulary tokens matching `pattern`, sorted.
pub fn brute_force_wildcard(vocabulary: &[&str], pattern: &str) -> Vec<String> {
    let mut out: Vec<String> = vocabulary
        .iter()
        .filter(|w| glob_matches(pattern.as_bytes(), w.as_bytes()))
        .map(|w| w.to_string())
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Vocabulary tokens within `k` edits of `query`, sorted, per `strsim`.
pub fn brute_force_fuzzy(vocabulary: &[&str], query: &str, k: usize) -> Vec<String> {
    let mut out: Vec<String> = vocabulary
        .iter()
        .filter(|w| strsim::levenshtein(w, query) <= k)
        .map(|w| w.to_string())
        .collect();
    out.sort();
    out.dedup();
    out
}

pub fn token_strings<'a>(tokens: impl IntoIterator<Item = &'a [u8]>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|t| String::from_utf8_lossy(t).into_owned())
        .collect()
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// Short tokens over a small alphabet so prefixes collide often.
pub fn token_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"abcde".to_vec()), 1..7)
}

/// Random `(token, doc, offset)` triples.
pub fn triples_strategy() -> impl Strategy<Value = Vec<Triple>> {
    prop::collection::vec((token_strategy(), 0u32..20, 0u32..50), 1..80)
}

/// Word-like strings for vocabularies.
pub fn word_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-e]{1,6}").unwrap()
}

/// A corpus of documents with non-decreasing ids.
pub fn corpus_strategy() -> impl Strategy<Value = Vec<(DocId, String)>> {
    prop::collection::vec(
        (0u32..3, prop::collection::vec(word_strategy(), 0..12)),
        1..25,
    )
    .prop_map(|docs| {
        let mut id = 0;
        docs.into_iter()
            .map(|(step, words)| {
                id += step;
                (id, words.join(" "))
            })
            .collect()
    })
}
