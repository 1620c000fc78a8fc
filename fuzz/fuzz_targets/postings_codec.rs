// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Postings blocks: decode garbage safely, round-trip sorted lists.

#![no_main]

use arbitrary::Arbitrary;
use ftrie::binary::{decode_postings, encode_postings};
use ftrie::types::{normalize_postings, Posting};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    raw: Vec<u8>,
    claimed: u16,
    pairs: Vec<(u32, u32)>,
}

fuzz_target!(|input: Input| {
    if let Ok((list, used)) = decode_postings(&input.raw, u32::from(input.claimed)) {
        assert_eq!(list.len(), usize::from(input.claimed));
        assert!(used <= input.raw.len());
    }

    let mut postings: Vec<Posting> = input
        .pairs
        .iter()
        .map(|&(doc, offset)| Posting::new(doc, offset))
        .collect();
    normalize_postings(&mut postings);

    let mut buf = Vec::new();
    encode_postings(&postings, &mut buf);
    let (decoded, used) = decode_postings(&buf, postings.len() as u32).expect("own encoding");
    assert_eq!(used, buf.len());
    assert_eq!(decoded, postings);
});
