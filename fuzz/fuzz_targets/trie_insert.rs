// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Arbitrary insert sequences keep the radix trie well formed, and the
//! flattened form answers the same lookups.

#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use ftrie::read::NodeStore;
use ftrie::trie::compact;
use ftrie::types::PostingsRef;
use ftrie::RadixTrie;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Insert {
    token: Vec<u8>,
    doc: u16,
    offset: u8,
}

fuzz_target!(|inserts: Vec<Insert>| {
    let mut trie = RadixTrie::new();
    let mut counts: BTreeMap<Vec<u8>, std::collections::BTreeSet<(u16, u8)>> = BTreeMap::new();
    for insert in inserts.iter().filter(|i| !i.token.is_empty() && i.token.len() <= 255) {
        trie.insert_posting(&insert.token, u32::from(insert.doc), u32::from(insert.offset));
        counts
            .entry(insert.token.clone())
            .or_default()
            .insert((insert.doc, insert.offset));
    }
    trie.check_invariants().expect("invariants");
    assert_eq!(trie.len(), counts.len());

    let tokens: Vec<Vec<u8>> = trie.iter().map(|(t, _)| t).collect();
    assert_eq!(tokens, counts.keys().cloned().collect::<Vec<_>>());

    let mut pointer = 0u64;
    let flat = compact(trie, |_, postings| {
        let r = PostingsRef {
            pointer,
            count: postings.len() as u32,
        };
        pointer += 1;
        Ok(r)
    })
    .expect("compact");
    let store = NodeStore::from_flattened(flat).expect("store");

    for (token, set) in &counts {
        let found = store.lookup(token).expect("lookup").expect("present");
        assert_eq!(found.count as usize, set.len());
    }
});
