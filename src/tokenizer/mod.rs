// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Text to tokens.
//!
//! A token is a maximal run of word characters (letters, digits, and the
//! combining marks riding on them). Each run goes through the same pipeline:
//!
//! ```text
//! "Cafés" ──► strip diacritics ──► fold case ──► stem ──► "cafe"
//!               (unless kept)      (CaseMode)   (optional)
//! ```
//!
//! Tokens whose normalized form is longer than `max_token_len` bytes are
//! dropped here and never reach the trie. They still use up a position, so
//! phrase distances across a dropped token stay honest.
//!
//! The iterator is lazy and `Clone`: cloning it before consuming gives you a
//! restart point, and calling [`Tokenizer::tokens`] again always starts over.

pub mod normalize;

use std::fmt;
use std::sync::Arc;

use rust_stemmers::Stemmer;

use crate::config::{CaseMode, TokenizerOptions};
use crate::error::Result;

pub use normalize::{fold_case, is_word_char, strip_diacritics};

/// A normalized token and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Ordinal position in the token stream (0-indexed).
    pub position: u32,
    /// Byte offset of the raw word in the source text.
    pub byte_offset: usize,
}

impl Token {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

/// Splits and normalizes text according to [`TokenizerOptions`].
#[derive(Clone)]
pub struct Tokenizer {
    options: TokenizerOptions,
    stemmer: Option<Arc<Stemmer>>,
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("options", &self.options)
            .field("stemming", &self.stemmer.is_some())
            .finish()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            options: TokenizerOptions::default(),
            stemmer: None,
        }
    }
}

impl Tokenizer {
    pub fn new(options: TokenizerOptions) -> Result<Self> {
        options.validate()?;
        let stemmer = options
            .stemming
            .then(|| Arc::new(Stemmer::create(options.language.to_algorithm())));
        Ok(Self { options, stemmer })
    }

    pub fn options(&self) -> &TokenizerOptions {
        &self.options
    }

    pub fn max_token_len(&self) -> usize {
        self.options.max_token_len
    }

    /// Lazily tokenize `text`.
    pub fn tokens<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        Tokens {
            tokenizer: self,
            text,
            cursor: 0,
            position: 0,
        }
    }

    /// Normalize a query term without splitting or stemming.
    ///
    /// Wildcard and fuzzy queries go through here: their operators are ASCII
    /// punctuation, which survives both diacritic stripping and case folding.
    pub fn normalize(&self, term: &str) -> String {
        let stripped = if self.options.diacritics {
            term.to_string()
        } else {
            strip_diacritics(term)
        };
        fold_case(&stripped, self.options.case)
    }

    /// Full pipeline for one word.
    fn normalize_word(&self, word: &str) -> String {
        let folded = self.normalize(word);
        match &self.stemmer {
            Some(stemmer) if self.options.case != CaseMode::Upper => {
                stemmer.stem(&folded).into_owned()
            }
            // Snowball stemmers expect lower-case input.
            Some(stemmer) => stemmer
                .stem(&folded.to_lowercase())
                .to_uppercase(),
            None => folded,
        }
    }
}

/// Lazy token stream over one text. See [`Tokenizer::tokens`].
#[derive(Clone)]
pub struct Tokens<'a> {
    tokenizer: &'a Tokenizer,
    text: &'a str,
    cursor: usize,
    position: u32,
}

impl<'a> Tokens<'a> {
    /// Next raw word and its byte offset, skipping separators.
    fn next_word(&mut self) -> Option<(usize, &'a str)> {
        let text: &'a str = self.text;
        let rest = &text[self.cursor..];
        let start = rest.char_indices().find(|(_, c)| is_word_char(*c))?.0;
        let word = &rest[start..];
        let len = word
            .char_indices()
            .find(|(_, c)| !is_word_char(*c))
            .map_or(word.len(), |(i, _)| i);

        let offset = self.cursor + start;
        self.cursor = offset + len;
        Some((offset, &text[offset..offset + len]))
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let (byte_offset, word) = self.next_word()?;
            let position = self.position;
            self.position += 1;

            let text = self.tokenizer.normalize_word(word);
            if text.is_empty() || text.len() > self.tokenizer.max_token_len() {
                continue;
            }
            return Some(Token {
                text,
                position,
                byte_offset,
            });
        }
    }
}
