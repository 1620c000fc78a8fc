// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Postings run encoding/decoding.
//!
//! Every token owns one contiguous run in the postings blob. The run carries
//! no length prefix: the `count` lives next to the pointer in the trie node or
//! token-table record, so a reader knows how many pairs to pull before it
//! touches the blob.
//!
//! Doc ids are delta-encoded against the previous posting in the run, so a
//! document that repeats the token costs a zero byte per extra occurrence.
//! Offsets are stored as-is. They restart in every document, so a delta
//! against the previous offset would go negative at each doc boundary.
//!
//! ```text
//! (1,0) (1,5) (4,2)  ──►  [1][0] [0][5] [3][2]
//! ```
//!
//! # References
//!
//! - **Delta Encoding for Postings**: Classic Information Retrieval technique.
//!   See Croft, Metzler, Strohman (2009): "Search Engines: Information Retrieval
//!   in Practice", Chapter 5 "Ranking with Indexes". Also Zobel & Moffat (2006):
//!   "Inverted Files for Text Search Engines", ACM Computing Surveys.

use std::io::{self, Read, Seek, SeekFrom};

use super::encoding::{encode_varint, read_varint};
use crate::types::{Posting, PostingsList, PostingsRef};

// ============================================================================
// POSTINGS ENCODING (Delta+Varint)
// ============================================================================

/// Append one postings run to `buf`.
///
/// `postings` must be sorted by `(doc, offset)`; the builder normalizes
/// before it gets here.
pub fn encode_postings(postings: &[Posting], buf: &mut Vec<u8>) {
    debug_assert!(postings.windows(2).all(|w| w[0] < w[1]));

    let mut prev_doc = 0u32;
    for posting in postings {
        encode_varint((posting.doc - prev_doc) as u64, buf);
        encode_varint(posting.offset as u64, buf);
        prev_doc = posting.doc;
    }
}

/// Every pair is at least two bytes, so a count that can't fit is corrupt
/// before we allocate anything for it.
fn check_fits(count: u32, available: u64) -> io::Result<()> {
    if u64::from(count).saturating_mul(2) > available {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "Postings run of {} entries cannot fit in {} bytes",
                count, available
            ),
        ));
    }
    Ok(())
}

/// Decode `count` pairs from `reader`, returning them and the bytes used.
fn read_run<R: Read>(reader: &mut R, count: u32) -> io::Result<(PostingsList, usize)> {
    let mut postings = Vec::with_capacity(count as usize);
    let mut pos = 0usize;
    let mut prev_doc = 0u32;

    for _ in 0..count {
        let (delta, consumed) = read_varint(reader)?;
        pos += consumed;
        let doc = u32::try_from(delta)
            .ok()
            .and_then(|d| prev_doc.checked_add(d))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "Doc id overflows u32")
            })?;

        let (offset, consumed) = read_varint(reader)?;
        pos += consumed;
        let offset = u32::try_from(offset).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "Offset overflows u32")
        })?;

        postings.push(Posting::new(doc, offset));
        prev_doc = doc;
    }

    Ok((postings, pos))
}

/// Decode `count` postings from the start of `bytes`.
///
/// Returns the postings and the number of bytes consumed.
pub fn decode_postings(bytes: &[u8], count: u32) -> io::Result<(PostingsList, usize)> {
    check_fits(count, bytes.len() as u64)?;
    let mut rest = bytes;
    read_run(&mut rest, count)
}

// ============================================================================
// STREAMED READS
// ============================================================================

/// Postings runs read straight from a postings file, one run at a time.
///
/// The merge asks for runs in the order they were written, so the stream
/// only seeks when a run does not start where the previous one ended.
#[derive(Debug)]
pub struct PostingsStream<R> {
    inner: R,
    /// Where `inner` is positioned; `u64::MAX` after a failed read.
    pos: u64,
    len: u64,
}

impl<R: Read + Seek> PostingsStream<R> {
    /// `len` is the file length, used to bound pointers and counts.
    pub fn new(inner: R, len: u64) -> Self {
        Self { inner, pos: 0, len }
    }

    /// Decode the run behind `postings`.
    pub fn read(&mut self, postings: PostingsRef) -> io::Result<PostingsList> {
        if postings.is_empty() {
            return Ok(Vec::new());
        }
        let available = self
            .len
            .checked_sub(postings.pointer)
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "pointer {} past end of {}-byte file",
                        postings.pointer, self.len
                    ),
                )
            })?;
        check_fits(postings.count, available)?;

        if postings.pointer != self.pos {
            self.pos = u64::MAX;
            self.inner.seek(SeekFrom::Start(postings.pointer))?;
            self.pos = postings.pointer;
        }
        match read_run(&mut self.inner, postings.count) {
            Ok((list, used)) => {
                self.pos += used as u64;
                Ok(list)
            }
            Err(e) => {
                self.pos = u64::MAX;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_layout() {
        let postings: PostingsList = vec![(1, 0).into(), (1, 5).into(), (4, 2).into()];
        let mut buf = Vec::new();
        encode_postings(&postings, &mut buf);
        assert_eq!(buf, vec![1, 0, 0, 5, 3, 2]);

        let (decoded, consumed) = decode_postings(&buf, 3).unwrap();
        assert_eq!(decoded, postings);
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_decode_stops_at_count() {
        let mut buf = Vec::new();
        encode_postings(&[Posting::new(300, 1000)], &mut buf);
        let first_len = buf.len();
        encode_postings(&[Posting::new(7, 7)], &mut buf);

        let (decoded, consumed) = decode_postings(&buf, 1).unwrap();
        assert_eq!(decoded, vec![Posting::new(300, 1000)]);
        assert_eq!(consumed, first_len);
    }

    #[test]
    fn test_decode_truncated_run() {
        let mut buf = Vec::new();
        encode_postings(&[(1, 1).into(), (2, 200).into()], &mut buf);
        buf.pop();
        assert!(decode_postings(&buf, 2).is_err());
        assert!(decode_postings(&[], 1).is_err());
        assert_eq!(decode_postings(&[], 0).unwrap().0, vec![]);
    }

    #[test]
    fn test_decode_rejects_doc_overflow() {
        let mut buf = Vec::new();
        encode_varint(u32::MAX as u64, &mut buf);
        encode_varint(0, &mut buf);
        encode_varint(1, &mut buf);
        encode_varint(0, &mut buf);
        let err = decode_postings(&buf, 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    /// Counts bytes pulled from the inner reader.
    struct Counting<R> {
        inner: R,
        bytes: usize,
    }

    impl<R: Read> Read for Counting<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.bytes += n;
            Ok(n)
        }
    }

    impl<R: Seek> Seek for Counting<R> {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    fn blob() -> (Vec<u8>, Vec<PostingsRef>, Vec<PostingsList>) {
        let runs: Vec<PostingsList> = vec![
            vec![(1, 0).into(), (1, 5).into(), (4, 2).into()],
            vec![(300, 1000).into()],
            vec![(2, 2).into(), (9, 0).into()],
        ];
        let mut buf = Vec::new();
        let mut refs = Vec::new();
        for run in &runs {
            let pointer = buf.len() as u64;
            encode_postings(run, &mut buf);
            refs.push(PostingsRef {
                pointer,
                count: run.len() as u32,
            });
        }
        (buf, refs, runs)
    }

    #[test]
    fn test_stream_reads_only_the_requested_runs() {
        let (buf, refs, runs) = blob();
        let len = buf.len() as u64;
        let mut stream = PostingsStream::new(
            Counting {
                inner: io::Cursor::new(buf),
                bytes: 0,
            },
            len,
        );
        assert_eq!(stream.read(refs[0]).unwrap(), runs[0]);
        assert_eq!(stream.inner.bytes, refs[1].pointer as usize);
        assert_eq!(stream.read(refs[1]).unwrap(), runs[1]);
        assert_eq!(stream.inner.bytes, refs[2].pointer as usize);
    }

    #[test]
    fn test_stream_seeks_out_of_order() {
        let (buf, refs, runs) = blob();
        let len = buf.len() as u64;
        let mut stream = PostingsStream::new(io::Cursor::new(buf), len);
        assert_eq!(stream.read(refs[2]).unwrap(), runs[2]);
        assert_eq!(stream.read(refs[0]).unwrap(), runs[0]);
        assert_eq!(stream.read(PostingsRef::EMPTY).unwrap(), vec![]);
        assert_eq!(stream.read(refs[1]).unwrap(), runs[1]);
    }

    #[test]
    fn test_stream_rejects_bad_refs() {
        let (buf, refs, _) = blob();
        let len = buf.len() as u64;
        let mut stream = PostingsStream::new(io::Cursor::new(buf), len);
        let past_end = PostingsRef {
            pointer: len,
            count: 1,
        };
        assert_eq!(
            stream.read(past_end).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
        let too_many = PostingsRef {
            pointer: refs[2].pointer,
            count: 1000,
        };
        assert!(stream.read(too_many).is_err());
        assert_eq!(stream.read(refs[1]).unwrap().len(), 1);
    }
}
