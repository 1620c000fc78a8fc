// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Wildcard parsing and trie walking on arbitrary patterns.
//!
//! The trie walk must agree with matching the pattern against each token
//! directly, whatever the pattern looks like.

#![no_main]

use arbitrary::Arbitrary;
use ftrie::read::NodeStore;
use ftrie::trie::compact;
use ftrie::types::PostingsRef;
use ftrie::{Pattern, RadixTrie};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    pattern: Vec<u8>,
    tokens: Vec<Vec<u8>>,
}

fuzz_target!(|input: Input| {
    let Ok(pattern) = Pattern::parse(&input.pattern) else {
        return;
    };

    let mut trie = RadixTrie::new();
    for token in input.tokens.iter().filter(|t| !t.is_empty() && t.len() <= 32).take(64) {
        trie.insert_posting(token, 0, 0);
    }
    let mut expected: Vec<Vec<u8>> = trie
        .iter()
        .map(|(token, _)| token)
        .filter(|token| pattern.matches(token))
        .collect();

    let mut next = 0u64;
    let flat = compact(trie, |_, postings| {
        let r = PostingsRef {
            pointer: next,
            count: postings.len() as u32,
        };
        next += 1;
        Ok(r)
    })
    .expect("compact");
    let store = NodeStore::from_flattened(flat).expect("store");

    let mut found: Vec<Vec<u8>> = store
        .wildcard(&pattern)
        .expect("walk")
        .into_iter()
        .map(|m| m.token)
        .collect();
    found.sort();
    expected.sort();
    assert_eq!(found, expected);
});
