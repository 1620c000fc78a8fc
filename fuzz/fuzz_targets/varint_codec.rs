// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Varint decoding on arbitrary bytes.
//!
//! Every offset in the token table and postings file goes through this
//! decoder, so it must reject garbage with an error and never panic.

#![no_main]

use ftrie::binary::{decode_varint, encode_varint};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok((value, consumed)) = decode_varint(data) else {
        return;
    };
    assert!(consumed >= 1 && consumed <= data.len().min(10));

    let mut reencoded = Vec::new();
    encode_varint(value, &mut reencoded);
    let (again, used) = decode_varint(&reencoded).expect("canonical encoding decodes");
    assert_eq!(value, again);
    assert_eq!(used, reencoded.len());
    assert!(reencoded.len() <= consumed, "canonical form is never longer");
});
