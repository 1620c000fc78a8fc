// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary encoding primitives: varints and fixed-width little-endian fields.
//!
//! Varints carry the postings (small doc deltas, small positions). Every
//! structural field is fixed width so records can be addressed by offset
//! arithmetic alone: 4-byte ids and counts, 5-byte blob pointers.
//!
//! # References
//!
//! - **Varint (LEB128)**: Little-endian base-128 variable-length integer encoding.
//!   Originally from DWARF debugging format (1992+), popularized by Protocol Buffers.
//!   See: DWARF4 specification §7.6 "Variable Length Data", and
//!   Google Protocol Buffers encoding: <https://protobuf.dev/programming-guides/encoding/>

use std::io::{self, Read};

use super::header::MAX_VARINT_BYTES;

// ============================================================================
// VARINT ENCODING
// ============================================================================

/// Encode a varint to bytes
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        } else {
            buf.push(byte | 0x80);
        }
    }
}

/// Decode a varint from bytes, returning (value, bytes_consumed)
///
/// Returns an error if:
/// - Buffer is empty
/// - Varint exceeds MAX_VARINT_BYTES (malformed input)
pub fn decode_varint(bytes: &[u8]) -> io::Result<(u64, usize)> {
    if bytes.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Empty buffer for varint",
        ));
    }

    let mut result: u64 = 0;
    let mut shift = 0;
    let mut i = 0;

    while i < bytes.len() && i < MAX_VARINT_BYTES {
        let byte = bytes[i];
        result |= ((byte & 0x7F) as u64) << shift;
        i += 1;
        if byte & 0x80 == 0 {
            return Ok((result, i));
        }
        shift += 7;
    }

    if i >= MAX_VARINT_BYTES {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Varint exceeds maximum length (possible corruption)",
        ))
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Incomplete varint",
        ))
    }
}

/// Decode a varint from a byte stream, returning (value, bytes_consumed).
///
/// Same rules as [`decode_varint`]; reads one byte at a time, so nothing
/// past the varint is consumed.
pub fn read_varint<R: Read>(reader: &mut R) -> io::Result<(u64, usize)> {
    let mut result: u64 = 0;
    let mut byte = [0u8; 1];
    for i in 0..MAX_VARINT_BYTES {
        reader.read_exact(&mut byte)?;
        result |= ((byte[0] & 0x7F) as u64) << (7 * i);
        if byte[0] & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "Varint exceeds maximum length (possible corruption)",
    ))
}

// ============================================================================
// FIXED-WIDTH FIELDS
// ============================================================================

#[inline]
pub fn put_u32(value: u32, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Write the low 40 bits of `value`. Callers check the range first.
#[inline]
pub fn put_u40(value: u64, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&value.to_le_bytes()[..5]);
}

/// Read a `u32` at `pos`, or `None` if it would run past the end.
#[inline]
pub fn get_u32(bytes: &[u8], pos: usize) -> Option<u32> {
    let b = bytes.get(pos..pos.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Read a 5-byte pointer at `pos`.
#[inline]
pub fn get_u40(bytes: &[u8], pos: usize) -> Option<u64> {
    let b = bytes.get(pos..pos.checked_add(5)?)?;
    Some(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], 0, 0, 0]))
}
