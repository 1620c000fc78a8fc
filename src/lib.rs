//! Full-text index over a compressed on-disk radix trie.
//!
//! Text goes in as `(doc id, text)` pairs and comes out as postings: every
//! `(doc, position)` where a token occurs. Tokens live in an edge-compressed
//! trie that is flattened into a handful of pointer-free files, so an index
//! opens by reading bytes and answers exact, wildcard and fuzzy lookups by
//! walking node ids.
//!
//! # Architecture
//!
//! ```text
//!   build:  text ─▶ tokenizer ─▶ trie ─▶ trie::compact ─▶ binary ─▶ ftx.*
//!                                 │                         ▲
//!                                 └─ partial-N/ ─▶ k-way merge
//!
//!   query:  text ─▶ index ─▶ read (trie / token table) ─▶ postings ─▶ hits
//! ```
//!
//! | Module      | Role                                                   |
//! |-------------|--------------------------------------------------------|
//! | `tokenizer` | Split, fold case, strip diacritics, stem               |
//! | `trie`      | Arena radix trie and its compaction to flat records    |
//! | `binary`    | File formats: varints, postings, token table, header   |
//! | `build`     | Bounded-memory builds with partial flush and merge     |
//! | `read`      | Exact, wildcard and fuzzy lookup over loaded files     |
//! | `postings`  | Sorted cursors and the union / intersect combinators   |
//! | `index`     | Text-level queries, phrases, stats                     |
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use ftrie::{Index, IndexConfig};
//!
//! let dir = Path::new("my-index");
//! let docs = vec![(1, "the cat sat"), (2, "a car and a cart")];
//! Index::build(dir, IndexConfig::default(), docs)?;
//!
//! let index = Index::open(dir)?;
//! let cats = index.lookup("cat")?;
//! let near_misses = index.fuzzy_search("cart", Some(1))?;
//! let phrase = index.phrase("a cart")?;
//! # Ok::<(), ftrie::IndexError>(())
//! ```

pub mod binary;
pub mod build;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod index;
pub mod postings;
pub mod read;
pub mod tokenizer;
pub mod trie;
pub mod types;

#[doc(hidden)]
pub mod testing;

pub use build::{BuildObserver, BuildOutcome, BuildSummary, IndexBuilder, NoopObserver};
pub use config::{CaseMode, IndexConfig, Language, TokenizerOptions};
pub use error::{IndexError, Result};
pub use index::{FileStat, Index, IndexStats, TokenFrequency};
pub use read::{FuzzyMatch, IndexReader, Pattern, TermMatch};
pub use tokenizer::{Token, Tokenizer};
pub use trie::RadixTrie;
pub use types::{DocId, Hit, Posting, PostingsList, PostingsRef, Span};
