// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Node files from an untrusted disk.
//!
//! Loading arbitrary size and record bytes, then querying them, must end
//! in `Ok` or `Err`. Child ids that point nowhere, labels that overrun a
//! record and cycles all have to surface as errors, not panics.

#![no_main]

use arbitrary::Arbitrary;
use ftrie::read::NodeStore;
use ftrie::Pattern;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    sizes: Vec<u8>,
    data: Vec<u8>,
    query: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let Ok(store) = NodeStore::from_bytes(&input.sizes, input.data) else {
        return;
    };
    let _ = store.lookup(&input.query);
    if input.query.len() <= 16 {
        let _ = store.fuzzy(&input.query, 1);
    }
    if let Ok(pattern) = Pattern::parse(&input.query) {
        let _ = store.wildcard(&pattern);
    }
});
