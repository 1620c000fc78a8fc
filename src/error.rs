// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types shared by the build and query paths.
//!
//! Two families matter here. `Inconsistent` is what the builder raises when
//! its own bookkeeping is wrong (a child pointer into nowhere, a node visited
//! twice). `Corrupt` is what the reader raises when the bytes on disk don't
//! add up. Neither is recoverable: a half-right index returns wrong answers,
//! which is worse than no answers.
//!
//! Cancellation is deliberately not in here. A cancelled build is an outcome,
//! see [`BuildOutcome`](crate::build::BuildOutcome).

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Everything that can go wrong while building or querying an index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("internal consistency failure: {0}")]
    Inconsistent(String),

    #[error("index file {file} is corrupt: {reason}")]
    Corrupt { file: &'static str, reason: String },

    #[error("unsupported wildcard pattern {pattern:?}: {reason}")]
    UnsupportedPattern { pattern: String, reason: &'static str },

    #[error("document ids must be non-decreasing: {next} follows {previous}")]
    DocumentOrder { previous: u32, next: u32 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        IndexError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(file: &'static str, reason: impl Into<String>) -> Self {
        IndexError::Corrupt {
            file,
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        IndexError::Inconsistent(reason.into())
    }

    /// True for failures that mean the index on disk can't be trusted.
    pub fn is_corruption(&self) -> bool {
        matches!(self, IndexError::Corrupt { .. })
    }
}

/// Attach a path to `io::Result` values.
pub(crate) trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|e| IndexError::io(path, e))
    }
}
