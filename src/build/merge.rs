// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! k-way merge of partial indexes.
//!
//! Every partial index is a complete index of its own. Only its node files
//! are loaded: a preorder [`TrieCursor`] over them yields tokens in byte
//! order, and each token's postings run is read from the partial's
//! postings file when the token is merged. Runs were written in that same
//! order, so each postings file is read once, front to back, and memory
//! stays at the partials' vocabularies plus one merged run. A min-heap over
//! the cursors' current tokens produces the global byte order:
//!
//! ```text
//!   partial-0: apple  cat  dog
//!   partial-1: bee    cat
//!   partial-2: cat    zebra
//!              ─────────────────►  apple bee cat(0,1,2) dog zebra
//! ```
//!
//! All cursors sitting on the same token are drained together and their
//! postings merged into one run, so the output never repeats a token. The
//! merged vocabulary is written to the token table as it streams by, and
//! collected into a small trie of postings references which is compacted
//! into the node files at the end.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::BuildObserver;
use crate::binary::{DataFile, IndexWriter, MetaHeader, StreamedIndex};
use crate::config::TokenizerOptions;
use crate::error::{IndexError, Result};
use crate::read::{NodeStore, TrieCursor};
use crate::trie::{compact, InsertCase, RadixTrie};
use crate::types::{PostingsList, PostingsRef};

/// How many merged tokens between progress reports and cancellation polls.
const POLL_INTERVAL: u64 = 256;

/// Merge `partials` into a fresh index in `dir`.
///
/// Returns `Ok(None)` if `cancelled` fired mid-merge; the caller cleans up.
pub(crate) fn merge_partials(
    partials: &[PathBuf],
    dir: &Path,
    options: &TokenizerOptions,
    doc_count: u32,
    cancelled: &dyn Fn() -> bool,
    observer: &mut dyn BuildObserver,
) -> Result<Option<MetaHeader>> {
    let mut sources = Vec::with_capacity(partials.len());
    let mut stores = Vec::with_capacity(partials.len());
    for path in partials {
        let (source, store) = open_partial(path)?;
        sources.push(source);
        stores.push(store);
    }

    let total: u64 = sources.iter().map(|s| s.header.token_count as u64).sum();
    observer.merge_started(sources.len(), total);
    debug!(partials = sources.len(), tokens = total, "merge started");

    let mut cursors: Vec<TrieCursor<'_>> = stores.iter().map(TrieCursor::new).collect();
    let mut heads = vec![PostingsRef::EMPTY; cursors.len()];
    let mut heap: BinaryHeap<Reverse<(Vec<u8>, usize)>> = BinaryHeap::new();
    for i in 0..cursors.len() {
        pull(&mut cursors, &mut heads, &mut heap, i)?;
    }

    let mut writer = IndexWriter::create(dir, options)?;
    writer.set_doc_count(doc_count);
    let mut vocab = RadixTrie::<PostingsRef>::new();
    let mut done = 0u64;

    while let Some(Reverse((token, first))) = heap.pop() {
        let mut tied = vec![first];
        while let Some(Reverse((next, _))) = heap.peek() {
            if *next != token {
                break;
            }
            if let Some(Reverse((_, i))) = heap.pop() {
                tied.push(i);
            }
        }

        let mut merged = PostingsList::new();
        for &i in &tied {
            merged.extend(sources[i].postings(heads[i])?);
            pull(&mut cursors, &mut heads, &mut heap, i)?;
        }

        let postings = writer.push(&token, &mut merged)?;
        if vocab.insert(&token, postings) == (InsertCase::Exact { appended: true }) {
            return Err(IndexError::inconsistent(format!(
                "token {:?} emitted twice by the merge",
                String::from_utf8_lossy(&token)
            )));
        }

        let before = done;
        done += tied.len() as u64;
        if before / POLL_INTERVAL != done / POLL_INTERVAL {
            observer.merge_progress(done, total);
            if cancelled() {
                return Ok(None);
            }
        }
    }
    observer.merge_progress(done, total);
    if cancelled() {
        return Ok(None);
    }

    let flat = compact(vocab, |_, postings| Ok(postings))?;
    let header = writer.finish(&flat)?;
    debug!(tokens = header.token_count, "merge finished");
    Ok(Some(header))
}

/// Load a partial's node files and open its postings for streaming.
fn open_partial(path: &Path) -> Result<(StreamedIndex, NodeStore)> {
    let mut source = StreamedIndex::open(path)?;
    let sizes = std::mem::take(&mut source.node_sizes);
    let store = NodeStore::from_bytes(&sizes, std::mem::take(&mut source.node_data))?;
    if store.len() != source.header.node_count as usize {
        return Err(IndexError::corrupt(
            DataFile::NodeSizes.name(),
            format!(
                "{} nodes, header says {}",
                store.len(),
                source.header.node_count
            ),
        ));
    }
    Ok((source, store))
}

/// Advance cursor `i` and queue its next token, if any.
fn pull(
    cursors: &mut [TrieCursor<'_>],
    heads: &mut [PostingsRef],
    heap: &mut BinaryHeap<Reverse<(Vec<u8>, usize)>>,
    i: usize,
) -> Result<()> {
    if let Some(next) = cursors[i].next() {
        let (token, postings) = next?;
        heads[i] = postings;
        heap.push(Reverse((token, i)));
    }
    Ok(())
}
