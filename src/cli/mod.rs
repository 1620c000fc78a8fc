// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the ftrie command-line interface.
//!
//! `build` turns a JSON-lines file into an index directory. `lookup`,
//! `wildcard`, `fuzzy` and `phrase` query one. `inspect` shows what an index
//! holds and can re-verify its checksums.

pub mod display;
#[cfg(feature = "progress")]
pub mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ftrie",
    about = "Full-text index over a compressed on-disk trie",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an index from a JSON-lines file of {"id": .., "text": ..}
    Build {
        /// Input file, one JSON document per line ("-" for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output index directory
        #[arg(short, long)]
        output: PathBuf,

        /// JSON build configuration (tokenizer options, memory limit)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Flush a partial index whenever the in-memory trie reaches this
        /// many bytes. Overrides the config file.
        #[arg(long)]
        memory_limit: Option<usize>,

        /// No progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Exact lookup of one term
    Lookup {
        /// Index directory
        index: PathBuf,

        term: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Tokens matching a pattern: `.` one byte, `.?` optional, `.*` any run,
    /// `.+` non-empty run, `\` escapes
    Wildcard {
        /// Index directory
        index: PathBuf,

        pattern: String,

        /// Maximum number of tokens to list
        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Tokens within an edit distance of a term
    Fuzzy {
        /// Index directory
        index: PathBuf,

        term: String,

        /// Edit budget (default: config, then a quarter of the term length)
        #[arg(short, long)]
        k: Option<usize>,

        /// Maximum number of tokens to list
        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Documents containing a phrase
    Phrase {
        /// Index directory
        index: PathBuf,

        text: String,

        /// Maximum number of documents to list
        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Show counts, file sizes and frequent tokens
    Inspect {
        /// Index directory
        index: PathBuf,

        /// How many of the most frequent tokens to show
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Re-check the CRC32 of every file
        #[arg(long)]
        verify: bool,

        #[arg(long)]
        json: bool,
    },
}
