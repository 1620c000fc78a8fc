// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! On-disk layout of an index.
//!
//! An index is a directory of six flat files. Nothing in them is a pointer
//! in the memory sense: every cross-reference is an integer offset or a node
//! id, so a reader can load the bytes and start answering queries with no
//! deserialization step.
//!
//! ```text
//! ┌───────────┬──────────────────────────────────────────────────────────┐
//! │ ftx.meta  │ header: magic "FTRI", version, tokenizer options, counts, │
//! │           │ length + CRC32 of each file below, header CRC32           │
//! ├───────────┼──────────────────────────────────────────────────────────┤
//! │ ftx.len   │ (len:u8, first_offset:u32) per token length + sentinel    │
//! │ ftx.tok   │ (token, pointer:u40, count:u32) by length, then bytes     │
//! │ ftx.post  │ delta/varint postings runs, one per token                 │
//! │ ftx.nsz   │ node record size:u32 per node id                          │
//! │ ftx.node  │ node records in preorder (see `trie::compact`)            │
//! └───────────┴──────────────────────────────────────────────────────────┘
//! ```
//!
//! The trie and the token table are two views of the same vocabulary and
//! point into the same postings blob. The meta file is written last, so a
//! directory without one is an index that never finished.
//!
//! # Security Considerations
//!
//! Readers treat every file as untrusted:
//! - File lengths must match the header before anything else is parsed
//! - Every offset is bounds-checked on access
//! - CRC32s catch corruption that keeps the lengths intact
//! - Varint decoding has a maximum iteration limit

pub mod encoding;
mod header;
mod postings;
mod table;

pub use encoding::{decode_varint, encode_varint, read_varint};
pub use header::{
    compute_crc32, FileEntry, FormatFlags, MetaHeader, MAGIC, MAX_VARINT_BYTES, VERSION,
};
pub use postings::{decode_postings, encode_postings, PostingsStream};
pub use table::{record_size, LengthBucket, TokenTable, TokenTableWriter};

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crc32fast::Hasher as Crc32Hasher;
use tracing::{debug, warn};

use crate::config::TokenizerOptions;
use crate::error::{IndexError, IoContext, Result};
use crate::trie::{compact, FlattenedTrie, RadixTrie};
use crate::types::{normalize_postings, PostingsList, PostingsRef};

/// Name of the header file.
pub const META_FILE: &str = "ftx.meta";

/// The five data files described by the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFile {
    LengthIndex = 0,
    TokenTable = 1,
    Postings = 2,
    NodeSizes = 3,
    NodeData = 4,
}

impl DataFile {
    pub const COUNT: usize = 5;

    pub const ALL: [DataFile; DataFile::COUNT] = [
        DataFile::LengthIndex,
        DataFile::TokenTable,
        DataFile::Postings,
        DataFile::NodeSizes,
        DataFile::NodeData,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DataFile::LengthIndex => "ftx.len",
            DataFile::TokenTable => "ftx.tok",
            DataFile::Postings => "ftx.post",
            DataFile::NodeSizes => "ftx.nsz",
            DataFile::NodeData => "ftx.node",
        }
    }
}

// ============================================================================
// WRITING
// ============================================================================

/// Streams postings to disk and lays out everything else on `finish`.
///
/// Tokens must be pushed in strictly increasing byte order.
pub struct IndexWriter {
    dir: PathBuf,
    header: MetaHeader,
    postings: BufWriter<File>,
    postings_len: u64,
    postings_crc: Crc32Hasher,
    table: TokenTableWriter,
    scratch: Vec<u8>,
}

impl IndexWriter {
    /// Create `dir` (if needed) and start a new index in it.
    pub fn create(dir: &Path, options: &TokenizerOptions) -> Result<Self> {
        fs::create_dir_all(dir).at(dir)?;
        let path = dir.join(DataFile::Postings.name());
        let file = File::create(&path).at(&path)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            header: MetaHeader::new(options),
            postings: BufWriter::new(file),
            postings_len: 0,
            postings_crc: Crc32Hasher::new(),
            table: TokenTableWriter::new(),
            scratch: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append the postings of `token`, returning where they landed.
    ///
    /// `postings` is sorted and deduplicated in place first.
    pub fn push(&mut self, token: &[u8], postings: &mut PostingsList) -> Result<PostingsRef> {
        normalize_postings(postings);
        let pointer = self.postings_len;
        if pointer > PostingsRef::MAX_POINTER {
            return Err(IndexError::inconsistent(format!(
                "postings blob offset {} exceeds 40 bits",
                pointer
            )));
        }
        let count = u32::try_from(postings.len()).map_err(|_| {
            IndexError::inconsistent(format!("{} postings for one token", postings.len()))
        })?;
        let postings_ref = PostingsRef { pointer, count };

        self.table
            .push(token, postings_ref)
            .map_err(|e| IndexError::inconsistent(format!("token table: {}", e)))?;

        self.scratch.clear();
        encode_postings(postings, &mut self.scratch);
        let path = self.dir.join(DataFile::Postings.name());
        self.postings.write_all(&self.scratch).at(&path)?;
        self.postings_crc.update(&self.scratch);
        self.postings_len += self.scratch.len() as u64;
        self.header.posting_count += postings.len() as u64;

        Ok(postings_ref)
    }

    pub fn set_doc_count(&mut self, docs: u32) {
        self.header.doc_count = docs;
    }

    /// Tokens pushed so far.
    pub fn token_count(&self) -> u32 {
        self.table.len()
    }

    /// Write the token table, length index, node files and finally the
    /// meta file.
    pub fn finish(self, trie: &FlattenedTrie) -> Result<MetaHeader> {
        let IndexWriter {
            dir,
            mut header,
            postings,
            postings_len,
            postings_crc,
            table,
            ..
        } = self;

        let post_path = dir.join(DataFile::Postings.name());
        let file = postings
            .into_inner()
            .map_err(|e| IndexError::io(&post_path, e.into_error()))?;
        file.sync_all().at(&post_path)?;
        header.files[DataFile::Postings as usize] = FileEntry {
            len: postings_len,
            crc32: postings_crc.finalize(),
        };

        header.token_count = table.len();
        header.node_count = u32::try_from(trie.node_count())
            .map_err(|_| IndexError::inconsistent("node count exceeds u32"))?;

        let (table_bytes, length_index) = table
            .finish()
            .map_err(|e| IndexError::inconsistent(format!("token table: {}", e)))?;

        write_data(&dir, &mut header, DataFile::TokenTable, &table_bytes)?;
        write_data(&dir, &mut header, DataFile::LengthIndex, &length_index)?;
        write_data(&dir, &mut header, DataFile::NodeSizes, &trie.sizes_bytes())?;
        write_data(&dir, &mut header, DataFile::NodeData, &trie.node_data)?;

        let meta_path = dir.join(META_FILE);
        fs::write(&meta_path, header.to_bytes()).at(&meta_path)?;

        debug!(
            dir = %dir.display(),
            tokens = header.token_count,
            nodes = header.node_count,
            postings = header.posting_count,
            "index written"
        );
        Ok(header)
    }
}

fn write_data(dir: &Path, header: &mut MetaHeader, file: DataFile, bytes: &[u8]) -> Result<()> {
    let path = dir.join(file.name());
    fs::write(&path, bytes).at(&path)?;
    header.files[file as usize] = FileEntry::of(bytes);
    Ok(())
}

/// Compact an in-memory trie straight into an index directory.
pub fn write_trie(
    dir: &Path,
    options: &TokenizerOptions,
    trie: RadixTrie<PostingsList>,
    doc_count: u32,
) -> Result<MetaHeader> {
    let mut writer = IndexWriter::create(dir, options)?;
    writer.set_doc_count(doc_count);
    let flat = compact(trie, |token, mut postings| writer.push(token, &mut postings))?;
    writer.finish(&flat)
}

/// Delete every index file in `dir`, then `dir` itself if it ended up empty.
///
/// Missing files are fine. Other failures are logged and skipped: this runs
/// on error paths where the original error is the one worth reporting.
pub fn remove_index(dir: &Path) {
    let names = DataFile::ALL.iter().map(|f| f.name()).chain([META_FILE]);
    for name in names {
        let path = dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove index file"),
        }
    }
    if let Err(e) = fs::remove_dir(dir) {
        if e.kind() != io::ErrorKind::NotFound {
            debug!(dir = %dir.display(), error = %e, "index directory left in place");
        }
    }
}

// ============================================================================
// READING
// ============================================================================

/// All six files of an index, loaded and length-checked.
#[derive(Debug, Clone)]
pub struct IndexFiles {
    pub header: MetaHeader,
    pub length_index: Vec<u8>,
    pub token_table: Vec<u8>,
    pub postings: Vec<u8>,
    pub node_sizes: Vec<u8>,
    pub node_data: Vec<u8>,
}

impl IndexFiles {
    pub fn read(dir: &Path) -> Result<Self> {
        let header = read_header(dir)?;
        Ok(Self {
            length_index: load(dir, &header, DataFile::LengthIndex)?,
            token_table: load(dir, &header, DataFile::TokenTable)?,
            postings: load(dir, &header, DataFile::Postings)?,
            node_sizes: load(dir, &header, DataFile::NodeSizes)?,
            node_data: load(dir, &header, DataFile::NodeData)?,
            header,
        })
    }

    pub fn bytes(&self, file: DataFile) -> &[u8] {
        match file {
            DataFile::LengthIndex => &self.length_index,
            DataFile::TokenTable => &self.token_table,
            DataFile::Postings => &self.postings,
            DataFile::NodeSizes => &self.node_sizes,
            DataFile::NodeData => &self.node_data,
        }
    }

    /// Re-hash every data file against the header.
    pub fn verify_checksums(&self) -> Result<()> {
        for file in DataFile::ALL {
            let expected = self.header.file(file).crc32;
            let actual = compute_crc32(self.bytes(file));
            if actual != expected {
                return Err(IndexError::corrupt(
                    file.name(),
                    format!("CRC32 {:08x}, header says {:08x}", actual, expected),
                ));
            }
        }
        Ok(())
    }
}

fn read_header(dir: &Path) -> Result<MetaHeader> {
    let meta_path = dir.join(META_FILE);
    let meta = fs::read(&meta_path).at(&meta_path)?;
    MetaHeader::from_bytes(&meta).map_err(|e| IndexError::corrupt(META_FILE, e.to_string()))
}

fn check_len(file: DataFile, on_disk: u64, header: &MetaHeader) -> Result<()> {
    let expected = header.file(file).len;
    if on_disk != expected {
        return Err(IndexError::corrupt(
            file.name(),
            format!("{} bytes on disk, header says {}", on_disk, expected),
        ));
    }
    Ok(())
}

fn load(dir: &Path, header: &MetaHeader, file: DataFile) -> Result<Vec<u8>> {
    let path = dir.join(file.name());
    let bytes = fs::read(&path).at(&path)?;
    check_len(file, bytes.len() as u64, header)?;
    Ok(bytes)
}

/// An index with its node files in memory and its postings left on disk.
///
/// This is how the merge reads partial indexes: the node files are the
/// vocabulary, the postings are the bulk, and each run is needed once.
#[derive(Debug)]
pub struct StreamedIndex {
    pub header: MetaHeader,
    pub node_sizes: Vec<u8>,
    pub node_data: Vec<u8>,
    pub postings: PostingsStream<BufReader<File>>,
    postings_path: PathBuf,
}

impl StreamedIndex {
    pub fn open(dir: &Path) -> Result<Self> {
        let header = read_header(dir)?;
        let node_sizes = load(dir, &header, DataFile::NodeSizes)?;
        let node_data = load(dir, &header, DataFile::NodeData)?;

        let postings_path = dir.join(DataFile::Postings.name());
        let file = File::open(&postings_path).at(&postings_path)?;
        let len = file.metadata().at(&postings_path)?.len();
        check_len(DataFile::Postings, len, &header)?;

        Ok(Self {
            header,
            node_sizes,
            node_data,
            postings: PostingsStream::new(BufReader::new(file), len),
            postings_path,
        })
    }

    /// Decode one postings run from disk.
    pub fn postings(&mut self, postings: PostingsRef) -> Result<PostingsList> {
        self.postings.read(postings).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                IndexError::corrupt(DataFile::Postings.name(), e.to_string())
            }
            _ => IndexError::io(&self.postings_path, e),
        })
    }
}
