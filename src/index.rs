// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The front door: build an index, open it, query it with text.
//!
//! [`IndexReader`] answers questions about normalized bytes. [`Index`] sits
//! on top and speaks text: it runs queries through the same tokenizer the
//! index was built with (options are read back from the meta file), turns
//! matching tokens into postings, and composes multi-token queries out of
//! the cursors in [`crate::postings`].
//!
//! | Query                 | Tokenizer step         | Reader path        |
//! |-----------------------|------------------------|--------------------|
//! | `lookup`, `count`     | full pipeline          | trie exact         |
//! | `wildcard_search`     | `normalize` (no split) | trie wildcard      |
//! | `fuzzy_search`        | `normalize` (no split) | trie fuzzy         |
//! | `phrase`, `near`      | full pipeline          | exact + Intersect  |
//!
//! Malformed input that can be expected (an empty query, a term longer than
//! the index's max token length, several words passed to a single-term
//! query) yields an empty result, not an error. Use `phrase` for the last.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::binary::{DataFile, IndexFiles, MetaHeader, META_FILE};
use crate::build::{BuildOutcome, IndexBuilder};
use crate::config::IndexConfig;
use crate::error::Result;
use crate::fuzzy::default_budget;
use crate::postings::{collect_hits, collect_postings, Intersect, ListCursor, MultiUnion, PostingsCursor};
use crate::read::{FuzzyMatch, IndexReader, Pattern, TermMatch};
use crate::tokenizer::Tokenizer;
use crate::types::{DocId, Hit, PostingsList, PostingsRef};

/// An open index plus the tokenizer its queries go through.
#[derive(Debug, Clone)]
pub struct Index {
    dir: PathBuf,
    reader: IndexReader,
    tokenizer: Tokenizer,
    fuzzy_errors: Option<usize>,
}

impl Index {
    /// Build an index in `dir`. Shorthand for [`IndexBuilder`] with no
    /// cancellation flag and no observer.
    pub fn build<I, S>(dir: &Path, config: IndexConfig, docs: I) -> Result<BuildOutcome>
    where
        I: IntoIterator<Item = (DocId, S)>,
        S: AsRef<str>,
    {
        IndexBuilder::new(config)?.build(dir, docs)
    }

    pub fn open(dir: &Path) -> Result<Self> {
        let reader = IndexReader::open(dir)?;
        let tokenizer = Tokenizer::new(reader.header().tokenizer_options())?;
        Ok(Self {
            dir: dir.to_path_buf(),
            reader,
            tokenizer,
            fuzzy_errors: None,
        })
    }

    /// Open and take the default fuzzy budget from `config`.
    ///
    /// Tokenizer options always come from the index itself.
    pub fn open_with(dir: &Path, config: &IndexConfig) -> Result<Self> {
        let mut index = Self::open(dir)?;
        index.fuzzy_errors = config.fuzzy_errors;
        Ok(index)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn header(&self) -> &MetaHeader {
        self.reader.header()
    }

    /// `term` as a single token after the full tokenizer pipeline.
    ///
    /// `None` when the term splits into several words, or when a word was
    /// dropped for being too long. Either way no one token stands for it.
    fn token(&self, term: &str) -> Option<String> {
        let mut tokens = self.tokenizer.tokens(term);
        let first = tokens.next()?;
        if first.position != 0 || tokens.next().is_some() {
            return None;
        }
        Some(first.text)
    }

    fn postings_ref(&self, term: &str) -> Result<Option<PostingsRef>> {
        match self.token(term) {
            Some(token) => self.reader.lookup(token.as_bytes()),
            None => Ok(None),
        }
    }

    /// Every occurrence of `term`, sorted by `(doc, offset)`.
    pub fn lookup(&self, term: &str) -> Result<PostingsList> {
        match self.postings_ref(term)? {
            Some(postings) => self.reader.postings(postings),
            None => Ok(Vec::new()),
        }
    }

    /// Number of occurrences of `term`, without decoding them.
    pub fn count(&self, term: &str) -> Result<u32> {
        Ok(self.postings_ref(term)?.map_or(0, |p| p.count))
    }

    /// Indexed tokens matching `pattern`.
    ///
    /// Returns [`IndexError::UnsupportedPattern`](crate::IndexError) for
    /// shapes the matcher does not handle, such as `.{2}`.
    pub fn wildcard_terms(&self, pattern: &str) -> Result<Vec<TermMatch>> {
        let normalized = self.tokenizer.normalize(pattern);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = Pattern::parse(normalized.as_bytes())?;
        self.reader.wildcard(&pattern)
    }

    /// Postings of every token matching `pattern`, merged.
    pub fn wildcard_search(&self, pattern: &str) -> Result<PostingsList> {
        let terms = self.wildcard_terms(pattern)?;
        self.union_of(terms.iter().map(|t| t.postings))
    }

    /// Indexed tokens within `k` edits of `term`.
    ///
    /// Without `k` the budget falls back to the configured `fuzzy_errors`,
    /// then to a quarter of the term's length.
    pub fn fuzzy_terms(&self, term: &str, k: Option<usize>) -> Result<Vec<FuzzyMatch>> {
        let normalized = self.tokenizer.normalize(term);
        let query = normalized.as_bytes();
        if query.is_empty() || query.len() > self.tokenizer.max_token_len() {
            return Ok(Vec::new());
        }
        let budget = k
            .or(self.fuzzy_errors)
            .unwrap_or_else(|| default_budget(query.len()));
        self.reader.fuzzy(query, budget)
    }

    /// Postings of every token within `k` edits of `term`, merged.
    pub fn fuzzy_search(&self, term: &str, k: Option<usize>) -> Result<PostingsList> {
        let terms = self.fuzzy_terms(term, k)?;
        self.union_of(terms.iter().map(|t| t.postings))
    }

    fn union_of(&self, refs: impl Iterator<Item = PostingsRef>) -> Result<PostingsList> {
        let cursors = refs
            .map(|r| self.reader.postings(r).map(ListCursor::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(collect_postings(MultiUnion::new(cursors)))
    }

    fn cursor(&self, token: &str) -> Result<ListCursor> {
        match self.reader.lookup(token.as_bytes())? {
            Some(postings) => Ok(ListCursor::new(self.reader.postings(postings)?)),
            None => Ok(ListCursor::empty()),
        }
    }

    /// Documents containing the tokens of `text` in order, each hit
    /// spanning a full occurrence of the phrase.
    ///
    /// Gaps left by tokens the tokenizer dropped are kept, so the phrase
    /// matches the same stretch it would have in a document.
    pub fn phrase(&self, text: &str) -> Result<Vec<Hit>> {
        let mut tokens = self.tokenizer.tokens(text);
        let Some(first) = tokens.next() else {
            return Ok(Vec::new());
        };

        let mut cursor: Box<dyn PostingsCursor> = Box::new(self.cursor(&first.text)?);
        let mut previous = first.position;
        for token in tokens {
            let right = self.cursor(&token.text)?;
            cursor = Box::new(Intersect::new(cursor, right, token.position - previous));
            previous = token.position;
        }
        Ok(collect_hits(cursor))
    }

    /// Documents where `right` starts exactly `distance` positions after
    /// `left`. `distance = 1` is adjacency.
    pub fn near(&self, left: &str, right: &str, distance: u32) -> Result<Vec<Hit>> {
        let (Some(left), Some(right)) = (self.token(left), self.token(right)) else {
            return Ok(Vec::new());
        };
        let joined = Intersect::new(self.cursor(&left)?, self.cursor(&right)?, distance);
        Ok(collect_hits(joined))
    }

    /// Counts, file sizes and the `top` most frequent tokens.
    pub fn stats(&self, top: usize) -> Result<IndexStats> {
        let header = self.reader.header();

        let mut heaviest: BinaryHeap<Reverse<(u32, Vec<u8>)>> = BinaryHeap::new();
        if top > 0 {
            for entry in self.reader.tokens() {
                let (token, postings) = entry?;
                heaviest.push(Reverse((postings.count, token)));
                if heaviest.len() > top {
                    heaviest.pop();
                }
            }
        }
        let mut top_tokens: Vec<TokenFrequency> = heaviest
            .into_iter()
            .map(|Reverse((count, token))| TokenFrequency {
                token: String::from_utf8_lossy(&token).into_owned(),
                count,
            })
            .collect();
        top_tokens.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));

        let files = std::iter::once(FileStat {
            name: META_FILE,
            bytes: MetaHeader::SIZE as u64,
        })
        .chain(DataFile::ALL.iter().map(|&f| FileStat {
            name: f.name(),
            bytes: header.file(f).len,
        }))
        .collect();

        Ok(IndexStats {
            token_count: header.token_count,
            node_count: header.node_count,
            posting_count: header.posting_count,
            doc_count: header.doc_count,
            files,
            top_tokens,
        })
    }

    /// Re-read every file from disk and check its CRC32.
    pub fn verify(&self) -> Result<()> {
        IndexFiles::read(&self.dir)?.verify_checksums()
    }

    pub fn close(self) {
        self.reader.close();
    }
}

/// Snapshot returned by [`Index::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub token_count: u32,
    pub node_count: u32,
    pub posting_count: u64,
    pub doc_count: u32,
    pub files: Vec<FileStat>,
    /// Most postings first.
    pub top_tokens: Vec<TokenFrequency>,
}

impl IndexStats {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStat {
    pub name: &'static str,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenFrequency {
    pub token: String,
    pub count: u32,
}
