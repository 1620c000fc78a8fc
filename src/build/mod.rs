// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index construction with bounded memory.
//!
//! One pass over the documents feeds an in-memory [`RadixTrie`]. When its
//! estimated size crosses `memory_limit`, the trie is compacted into a
//! numbered partial index under the output directory and a fresh trie takes
//! over. At the end either the lone trie is written directly, or every
//! partial is merged into the final index (see [`merge`]):
//!
//! ```text
//!   docs ──► trie ──(limit)──► partial-0/
//!            trie ──(limit)──► partial-1/
//!            trie ──(end)────► partial-2/ ──┐
//!                                           ├─ k-way merge ──► ftx.*
//!            partial-0/, partial-1/ ────────┘
//! ```
//!
//! Failure and cancellation both leave nothing behind: a guard removes the
//! partial directories and any final files written so far.

mod merge;
mod observer;

pub use observer::{BuildObserver, NoopObserver};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::binary::{remove_index, write_trie, DataFile, MetaHeader, META_FILE};
use crate::config::IndexConfig;
use crate::error::{IndexError, IoContext, Result};
use crate::tokenizer::Tokenizer;
use crate::trie::RadixTrie;
use crate::types::{DocId, PostingsList};

/// How a build ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Completed(BuildSummary),
    /// The cancellation flag was raised. Nothing was left on disk.
    Cancelled,
}

impl BuildOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BuildOutcome::Cancelled)
    }

    pub fn summary(&self) -> Option<&BuildSummary> {
        match self {
            BuildOutcome::Completed(summary) => Some(summary),
            BuildOutcome::Cancelled => None,
        }
    }
}

/// What a finished build produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    /// Texts consumed, including repeated ids.
    pub documents: u64,
    /// Distinct document ids.
    pub doc_count: u32,
    pub token_count: u32,
    pub node_count: u32,
    pub posting_count: u64,
    /// Partial indexes flushed on the way (0 when everything fit in memory).
    pub partials: usize,
}

impl BuildSummary {
    fn new(header: &MetaHeader, documents: u64, partials: usize) -> Self {
        Self {
            documents,
            doc_count: header.doc_count,
            token_count: header.token_count,
            node_count: header.node_count,
            posting_count: header.posting_count,
            partials,
        }
    }
}

/// Builds one index directory from a stream of `(doc id, text)` pairs.
///
/// Doc ids must be non-decreasing. The same id may repeat (several fields of
/// one document, say); its texts share the id but not positions, each text
/// starts again at position 0.
pub struct IndexBuilder<'a> {
    config: IndexConfig,
    tokenizer: Tokenizer,
    cancel: Option<&'a AtomicBool>,
    observer: Box<dyn BuildObserver + 'a>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        let tokenizer = Tokenizer::new(config.tokenizer.clone())?;
        Ok(Self {
            config,
            tokenizer,
            cancel: None,
            observer: Box::new(NoopObserver),
        })
    }

    /// Poll `flag` between documents and during the merge.
    pub fn cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn observer(mut self, observer: impl BuildObserver + 'a) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Build into `dir`, replacing any index already there.
    pub fn build<I, S>(mut self, dir: &Path, docs: I) -> Result<BuildOutcome>
    where
        I: IntoIterator<Item = (DocId, S)>,
        S: AsRef<str>,
    {
        let started = Instant::now();
        fs::create_dir_all(dir).at(dir)?;
        remove_index_files(dir);
        info!(dir = %dir.display(), memory_limit = ?self.config.memory_limit, "build started");

        let mut guard = CleanupGuard::new(dir);
        let mut pass = Pass::default();

        for (id, text) in docs {
            if self.cancelled() {
                info!(documents = pass.documents, "build cancelled");
                return Ok(BuildOutcome::Cancelled);
            }
            pass.accept(id)?;
            for token in self.tokenizer.tokens(text.as_ref()) {
                pass.trie.insert_posting(token.as_bytes(), id, token.position);
            }
            self.observer.documents_indexed(pass.documents);

            let over_limit = self
                .config
                .memory_limit
                .is_some_and(|limit| pass.trie.approx_bytes() >= limit);
            if over_limit && !pass.trie.is_empty() {
                self.flush(&mut pass, &mut guard)?;
            }
        }

        if self.cancelled() {
            info!(documents = pass.documents, "build cancelled");
            return Ok(BuildOutcome::Cancelled);
        }

        let header = if guard.partials.is_empty() {
            let trie = std::mem::take(&mut pass.trie);
            write_trie(dir, &self.config.tokenizer, trie, pass.total_docs)?
        } else {
            if !pass.trie.is_empty() {
                self.flush(&mut pass, &mut guard)?;
            }
            let cancel = self.cancel;
            let cancelled = move || cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));
            let merged = merge::merge_partials(
                &guard.partials,
                dir,
                &self.config.tokenizer,
                pass.total_docs,
                &cancelled,
                self.observer.as_mut(),
            )?;
            match merged {
                Some(header) => header,
                None => {
                    info!("build cancelled during merge");
                    return Ok(BuildOutcome::Cancelled);
                }
            }
        };

        let summary = BuildSummary::new(&header, pass.documents, guard.partials.len());
        guard.finish();
        info!(
            tokens = summary.token_count,
            nodes = summary.node_count,
            postings = summary.posting_count,
            docs = summary.doc_count,
            partials = summary.partials,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "build finished"
        );
        self.observer.finished(&summary);
        Ok(BuildOutcome::Completed(summary))
    }

    /// Write the current trie as the next partial index and start over.
    fn flush(&mut self, pass: &mut Pass, guard: &mut CleanupGuard) -> Result<()> {
        let number = guard.partials.len();
        let path = guard.dir.join(format!("partial-{number}"));
        let trie = std::mem::take(&mut pass.trie);
        debug!(
            partial = number,
            tokens = trie.len(),
            approx_bytes = trie.approx_bytes(),
            "flushing partial index"
        );

        // Register first so a failed write is still cleaned up.
        guard.partials.push(path.clone());
        fs::create_dir_all(&path).at(&path)?;
        let header = write_trie(&path, &self.config.tokenizer, trie, pass.partial_docs)?;
        pass.partial_docs = 0;
        pass.partial_last = None;
        self.observer.partial_flushed(number, header.token_count);
        Ok(())
    }
}

/// Mutable state of one pass over the documents.
#[derive(Default)]
struct Pass {
    trie: RadixTrie<PostingsList>,
    documents: u64,
    last: Option<DocId>,
    total_docs: u32,
    /// Distinct ids since the last flush.
    partial_docs: u32,
    partial_last: Option<DocId>,
}

impl Pass {
    fn accept(&mut self, id: DocId) -> Result<()> {
        if let Some(previous) = self.last {
            if id < previous {
                return Err(IndexError::DocumentOrder { previous, next: id });
            }
        }
        if self.last != Some(id) {
            self.total_docs += 1;
        }
        if self.partial_last != Some(id) {
            self.partial_docs += 1;
        }
        self.last = Some(id);
        self.partial_last = Some(id);
        self.documents += 1;
        Ok(())
    }
}

/// Removes partial directories always, and the final index files unless
/// the build completed.
struct CleanupGuard {
    dir: PathBuf,
    partials: Vec<PathBuf>,
    completed: bool,
}

impl CleanupGuard {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            partials: Vec::new(),
            completed: false,
        }
    }

    fn finish(&mut self) {
        self.completed = true;
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        for partial in &self.partials {
            remove_index(partial);
        }
        if !self.completed {
            debug!(dir = %self.dir.display(), "removing unfinished index");
            remove_index_files(&self.dir);
        }
    }
}

/// Like [`remove_index`] but keeps the directory, which the caller owns.
fn remove_index_files(dir: &Path) {
    let names = DataFile::ALL.iter().map(|f| f.name()).chain([META_FILE]);
    for name in names {
        let _ = fs::remove_file(dir.join(name));
    }
}
