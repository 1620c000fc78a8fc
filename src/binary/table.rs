// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The sorted token table and its length index.
//!
//! The table is the flat twin of the trie: every token once, grouped into
//! buckets by byte length, sorted lexicographically inside each bucket.
//! Inside a bucket every record has the same size, so record `i` sits at
//! `bucket.start + i * (len + 9)` and a binary search needs no directory.
//!
//! ```text
//! ftx.len:  (1, 0) (3, 20) (4, 56) (0, 69)      ◄── sentinel = table length
//!              │      │       │
//! ftx.tok:  [a|ptr|cnt][b|ptr|cnt] [car|..][cat|..][dog|..] [cart|..]
//! ```
//!
//! The length index is also what makes fuzzy scans cheap: a query of length
//! `n` with `k` edits only needs the buckets `n-k ..= n+k`, a contiguous run
//! of the table.

use std::collections::BTreeMap;
use std::io;
use std::ops::RangeInclusive;

use super::encoding::{get_u32, get_u40, put_u32, put_u40};
use crate::types::PostingsRef;

/// Bytes after the token in every record: 5-byte pointer + 4-byte count.
pub const RECORD_TAIL: usize = 9;

/// Size of one length-index entry.
pub const LENGTH_ENTRY: usize = 5;

#[inline]
pub fn record_size(token_len: usize) -> usize {
    token_len + RECORD_TAIL
}

// ============================================================================
// WRITER
// ============================================================================

/// Collects token records and lays out the table on `finish`.
///
/// Tokens must arrive in lexicographic order. Each bucket then receives its
/// tokens in order too, so nothing is sorted at the end.
#[derive(Debug, Default)]
pub struct TokenTableWriter {
    buckets: BTreeMap<u8, Vec<u8>>,
    last: Option<Vec<u8>>,
    count: u32,
}

impl TokenTableWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: &[u8], postings: PostingsRef) -> io::Result<()> {
        let len = u8::try_from(token.len())
            .ok()
            .filter(|&l| l > 0)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("token length {} outside 1..=255", token.len()),
                )
            })?;
        if let Some(last) = &self.last {
            if last.as_slice() >= token {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "tokens must be pushed in strictly increasing order",
                ));
            }
        }
        if postings.pointer > PostingsRef::MAX_POINTER {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "postings pointer does not fit in 40 bits",
            ));
        }

        let bucket = self.buckets.entry(len).or_default();
        bucket.extend_from_slice(token);
        put_u40(postings.pointer, bucket);
        put_u32(postings.count, bucket);

        self.last = Some(token.to_vec());
        self.count += 1;
        Ok(())
    }

    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Lay out `(table, length_index)`.
    pub fn finish(self) -> io::Result<(Vec<u8>, Vec<u8>)> {
        let total: usize = self.buckets.values().map(Vec::len).sum();
        let mut table = Vec::with_capacity(total);
        let mut index = Vec::with_capacity((self.buckets.len() + 1) * LENGTH_ENTRY);

        for (len, records) in self.buckets {
            index.push(len);
            put_u32(table_offset(table.len())?, &mut index);
            table.extend_from_slice(&records);
        }
        index.push(0);
        put_u32(table_offset(table.len())?, &mut index);

        Ok((table, index))
    }
}

fn table_offset(len: usize) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "token table exceeds 4 GiB addressable by the length index",
        )
    })
}

// ============================================================================
// READER
// ============================================================================

/// One length bucket: every token in `start..end` is `len` bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBucket {
    pub len: u8,
    pub start: usize,
    pub end: usize,
}

impl LengthBucket {
    #[inline]
    pub fn records(&self) -> usize {
        (self.end - self.start) / record_size(self.len as usize)
    }
}

/// Parsed token table with its length index.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    bytes: Vec<u8>,
    buckets: Vec<LengthBucket>,
}

impl TokenTable {
    /// Validate and wrap `table` using the raw length index.
    pub fn parse(table: Vec<u8>, length_index: &[u8]) -> io::Result<Self> {
        if length_index.is_empty() || length_index.len() % LENGTH_ENTRY != 0 {
            return Err(invalid(format!(
                "length index size {} is not a multiple of {}",
                length_index.len(),
                LENGTH_ENTRY
            )));
        }

        let entries: Vec<(u8, usize)> = length_index
            .chunks_exact(LENGTH_ENTRY)
            .map(|c| (c[0], u32::from_le_bytes([c[1], c[2], c[3], c[4]]) as usize))
            .collect();

        let (sentinel_len, sentinel_offset) = entries[entries.len() - 1];
        if sentinel_len != 0 || sentinel_offset != table.len() {
            return Err(invalid(format!(
                "length index sentinel ({}, {}) does not close a table of {} bytes",
                sentinel_len,
                sentinel_offset,
                table.len()
            )));
        }

        let mut buckets = Vec::with_capacity(entries.len() - 1);
        for pair in entries.windows(2) {
            let ((len, start), (next_len, end)) = (pair[0], pair[1]);
            if len == 0 {
                return Err(invalid("zero-length bucket before sentinel".into()));
            }
            if next_len != 0 && next_len <= len {
                return Err(invalid(format!(
                    "bucket lengths not ascending: {} then {}",
                    len, next_len
                )));
            }
            if end < start || (end - start) % record_size(len as usize) != 0 {
                return Err(invalid(format!(
                    "bucket for length {} spans {}..{}, not a whole number of records",
                    len, start, end
                )));
            }
            buckets.push(LengthBucket { len, start, end });
        }
        if buckets.first().map_or(0, |b| b.start) != 0 {
            return Err(invalid("first bucket does not start at offset 0".into()));
        }

        Ok(Self {
            bytes: table,
            buckets,
        })
    }

    pub fn buckets(&self) -> &[LengthBucket] {
        &self.buckets
    }

    pub fn bucket(&self, len: usize) -> Option<LengthBucket> {
        let len = u8::try_from(len).ok()?;
        self.buckets
            .binary_search_by_key(&len, |b| b.len)
            .ok()
            .map(|i| self.buckets[i])
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(LengthBucket::records).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Record `i` of `bucket`.
    pub fn entry(&self, bucket: LengthBucket, i: usize) -> Option<(&[u8], PostingsRef)> {
        let len = bucket.len as usize;
        let pos = bucket.start + i * record_size(len);
        if pos >= bucket.end {
            return None;
        }
        let token = self.bytes.get(pos..pos + len)?;
        let pointer = get_u40(&self.bytes, pos + len)?;
        let count = get_u32(&self.bytes, pos + len + 5)?;
        Some((token, PostingsRef { pointer, count }))
    }

    /// Binary search for `token` inside its length bucket.
    pub fn find(&self, token: &[u8]) -> Option<PostingsRef> {
        let bucket = self.bucket(token.len())?;
        let (mut lo, mut hi) = (0, bucket.records());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let (candidate, postings) = self.entry(bucket, mid)?;
            match candidate.cmp(token) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return Some(postings),
            }
        }
        None
    }

    /// All records of the buckets whose length falls in `lengths`.
    pub fn entries_in(
        &self,
        lengths: RangeInclusive<usize>,
    ) -> impl Iterator<Item = (&[u8], PostingsRef)> + '_ {
        self.buckets
            .iter()
            .filter(move |b| lengths.contains(&(b.len as usize)))
            .flat_map(move |&b| (0..b.records()).filter_map(move |i| self.entry(b, i)))
    }
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}
