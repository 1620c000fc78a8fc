// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index configuration.
//!
//! Everything that changes what ends up on disk lives in
//! [`TokenizerOptions`], and those options are persisted in the meta file so
//! a reopened index normalizes queries the same way it normalized text.
//! [`IndexConfig`] adds the build-only knobs on top.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, IoContext, Result};

/// Hard ceiling: token and label lengths are stored in one byte.
pub const MAX_TOKEN_LEN_LIMIT: usize = 255;

/// Default maximum token length.
pub const DEFAULT_MAX_TOKEN_LEN: usize = 96;

/// How letters are case-folded before indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Lower-case everything.
    #[default]
    Insensitive,
    /// Upper-case everything.
    Upper,
    /// Keep case as written.
    Sensitive,
}

/// Stemming language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Arabic,
    Danish,
    Dutch,
    #[default]
    English,
    Finnish,
    French,
    German,
    Greek,
    Hungarian,
    Italian,
    Norwegian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Tamil,
    Turkish,
}

impl Language {
    const ALL: [Language; 18] = [
        Language::Arabic,
        Language::Danish,
        Language::Dutch,
        Language::English,
        Language::Finnish,
        Language::French,
        Language::German,
        Language::Greek,
        Language::Hungarian,
        Language::Italian,
        Language::Norwegian,
        Language::Portuguese,
        Language::Romanian,
        Language::Russian,
        Language::Spanish,
        Language::Swedish,
        Language::Tamil,
        Language::Turkish,
    ];

    /// Stable one-byte code used by the meta file.
    pub fn code(self) -> u8 {
        Self::ALL.iter().position(|l| *l == self).unwrap_or(3) as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub(crate) fn to_algorithm(self) -> rust_stemmers::Algorithm {
        use rust_stemmers::Algorithm;
        match self {
            Language::Arabic => Algorithm::Arabic,
            Language::Danish => Algorithm::Danish,
            Language::Dutch => Algorithm::Dutch,
            Language::English => Algorithm::English,
            Language::Finnish => Algorithm::Finnish,
            Language::French => Algorithm::French,
            Language::German => Algorithm::German,
            Language::Greek => Algorithm::Greek,
            Language::Hungarian => Algorithm::Hungarian,
            Language::Italian => Algorithm::Italian,
            Language::Norwegian => Algorithm::Norwegian,
            Language::Portuguese => Algorithm::Portuguese,
            Language::Romanian => Algorithm::Romanian,
            Language::Russian => Algorithm::Russian,
            Language::Spanish => Algorithm::Spanish,
            Language::Swedish => Algorithm::Swedish,
            Language::Tamil => Algorithm::Tamil,
            Language::Turkish => Algorithm::Turkish,
        }
    }
}

/// Options that decide how raw text becomes tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    pub case: CaseMode,
    /// Keep diacritics (`true`) or strip them (`false`).
    pub diacritics: bool,
    pub stemming: bool,
    pub language: Language,
    /// Longer tokens are dropped at the tokenizer.
    pub max_token_len: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            case: CaseMode::Insensitive,
            diacritics: false,
            stemming: false,
            language: Language::English,
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
        }
    }
}

impl TokenizerOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_token_len == 0 || self.max_token_len > MAX_TOKEN_LEN_LIMIT {
            return Err(IndexError::Config(format!(
                "max_token_len must be in 1..={}, got {}",
                MAX_TOKEN_LEN_LIMIT, self.max_token_len
            )));
        }
        Ok(())
    }
}

/// Build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub tokenizer: TokenizerOptions,
    /// Estimated in-memory trie size (bytes) that triggers a partial flush.
    pub memory_limit: Option<usize>,
    /// Default fuzzy edit budget. `None` means `token_len / 4`.
    pub fuzzy_errors: Option<usize>,
}

impl IndexConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).at(path)?;
        let config: IndexConfig = serde_json::from_str(&content)
            .map_err(|e| IndexError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tokenizer.validate()?;
        if self.memory_limit == Some(0) {
            return Err(IndexError::Config("memory_limit must be positive".into()));
        }
        Ok(())
    }

    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerOptions) -> Self {
        self.tokenizer = tokenizer;
        self
    }
}
