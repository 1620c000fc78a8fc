// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The meta file: one fixed-size header describing the other five files.
//!
//! The header is 96 bytes of fixed-size fields, parsed in one go before any
//! other file is touched. It records the tokenizer options the index was
//! built with, a few counts for `stats`, and for every data file its exact
//! byte length and CRC32. The last four bytes are a CRC32 over the first 92.
//!
//! Lengths are checked on every open (cheap). Data CRCs are only re-checked
//! by an explicit verify, since that means hashing every byte of the index.

use std::io;

use crc32fast::Hasher as Crc32Hasher;

use super::DataFile;
use crate::config::{CaseMode, Language, TokenizerOptions};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "FTRI" in ASCII
pub const MAGIC: [u8; 4] = *b"FTRI";

/// Current format version
pub const VERSION: u8 = 1;

/// Maximum varint bytes (u64 needs at most 10 bytes)
pub const MAX_VARINT_BYTES: usize = 10;

// ============================================================================
// FLAGS
// ============================================================================

/// Tokenizer flags persisted with the index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags(pub(crate) u8);

impl FormatFlags {
    pub const KEEP_DIACRITICS: u8 = 0b0000_0001;
    pub const STEMMING: u8 = 0b0000_0010;

    pub fn new() -> Self {
        Self(0)
    }

    pub fn with_diacritics(mut self, keep: bool) -> Self {
        if keep {
            self.0 |= Self::KEEP_DIACRITICS;
        }
        self
    }

    pub fn with_stemming(mut self, stemming: bool) -> Self {
        if stemming {
            self.0 |= Self::STEMMING;
        }
        self
    }

    pub fn keeps_diacritics(self) -> bool {
        self.0 & Self::KEEP_DIACRITICS != 0
    }

    pub fn stems(self) -> bool {
        self.0 & Self::STEMMING != 0
    }
}

fn case_code(case: CaseMode) -> u8 {
    match case {
        CaseMode::Insensitive => 0,
        CaseMode::Upper => 1,
        CaseMode::Sensitive => 2,
    }
}

fn case_from_code(code: u8) -> Option<CaseMode> {
    match code {
        0 => Some(CaseMode::Insensitive),
        1 => Some(CaseMode::Upper),
        2 => Some(CaseMode::Sensitive),
        _ => None,
    }
}

// ============================================================================
// HEADER
// ============================================================================

/// Byte length and checksum of one data file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileEntry {
    pub len: u64,
    pub crc32: u32,
}

impl FileEntry {
    pub fn of(bytes: &[u8]) -> Self {
        Self {
            len: bytes.len() as u64,
            crc32: compute_crc32(bytes),
        }
    }
}

/// Contents of `ftx.meta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaHeader {
    pub version: u8,
    pub flags: FormatFlags,
    pub case: CaseMode,
    pub language: Language,
    pub max_token_len: u8,
    pub token_count: u32,
    pub node_count: u32,
    pub doc_count: u32,
    pub posting_count: u64,
    /// Indexed by [`DataFile`] discriminant.
    pub files: [FileEntry; DataFile::COUNT],
}

impl MetaHeader {
    // 4 (magic) + 5 (version, flags, case, language, max len) + 3 (reserved)
    // + 3*4 (u32 counts) + 8 (posting count) + 5*12 (file entries) + 4 (crc) = 96
    pub const SIZE: usize = 96;

    pub fn new(options: &TokenizerOptions) -> Self {
        Self {
            version: VERSION,
            flags: FormatFlags::new()
                .with_diacritics(options.diacritics)
                .with_stemming(options.stemming),
            case: options.case,
            language: options.language,
            max_token_len: options.max_token_len.min(u8::MAX as usize) as u8,
            token_count: 0,
            node_count: 0,
            doc_count: 0,
            posting_count: 0,
            files: [FileEntry::default(); DataFile::COUNT],
        }
    }

    /// Tokenizer options the index was built with.
    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            case: self.case,
            diacritics: self.flags.keeps_diacritics(),
            stemming: self.flags.stems(),
            language: self.language,
            max_token_len: self.max_token_len as usize,
        }
    }

    #[inline]
    pub fn file(&self, file: DataFile) -> FileEntry {
        self.files[file as usize]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.extend_from_slice(&MAGIC);
        buf.push(self.version);
        buf.push(self.flags.0);
        buf.push(case_code(self.case));
        buf.push(self.language.code());
        buf.push(self.max_token_len);
        buf.extend_from_slice(&[0u8; 3]); // reserved
        buf.extend_from_slice(&self.token_count.to_le_bytes());
        buf.extend_from_slice(&self.node_count.to_le_bytes());
        buf.extend_from_slice(&self.doc_count.to_le_bytes());
        buf.extend_from_slice(&self.posting_count.to_le_bytes());
        for entry in &self.files {
            buf.extend_from_slice(&entry.len.to_le_bytes());
            buf.extend_from_slice(&entry.crc32.to_le_bytes());
        }
        let crc = compute_crc32(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        debug_assert_eq!(buf.len(), Self::SIZE);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(invalid(format!(
                "meta header is {} bytes, expected {}",
                bytes.len(),
                Self::SIZE
            )));
        }
        if bytes[..4] != MAGIC {
            return Err(invalid(format!(
                "Invalid magic: expected FTRI, got {:?}",
                &bytes[..4]
            )));
        }

        let (body, stored) = bytes.split_at(Self::SIZE - 4);
        let stored = u32::from_le_bytes([stored[0], stored[1], stored[2], stored[3]]);
        if compute_crc32(body) != stored {
            return Err(invalid("meta header checksum mismatch".into()));
        }

        let version = bytes[4];
        if version != VERSION {
            return Err(invalid(format!(
                "unsupported format version {} (expected {})",
                version, VERSION
            )));
        }
        let case = case_from_code(bytes[6])
            .ok_or_else(|| invalid(format!("unknown case mode {}", bytes[6])))?;
        let language = Language::from_code(bytes[7])
            .ok_or_else(|| invalid(format!("unknown language code {}", bytes[7])))?;
        if bytes[8] == 0 {
            return Err(invalid("max token length is zero".into()));
        }

        let u32_at = |pos: usize| {
            u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
        };
        let u64_at = |pos: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&bytes[pos..pos + 8]);
            u64::from_le_bytes(b)
        };

        let mut files = [FileEntry::default(); DataFile::COUNT];
        for (i, entry) in files.iter_mut().enumerate() {
            let pos = 32 + i * 12;
            *entry = FileEntry {
                len: u64_at(pos),
                crc32: u32_at(pos + 8),
            };
        }

        Ok(Self {
            version,
            flags: FormatFlags(bytes[5]),
            case,
            language,
            max_token_len: bytes[8],
            token_count: u32_at(12),
            node_count: u32_at(16),
            doc_count: u32_at(20),
            posting_count: u64_at(24),
            files,
        })
    }
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Compute CRC32 over the given bytes
pub fn compute_crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
