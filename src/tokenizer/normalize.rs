// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Character-level normalization: diacritic stripping and case folding.
//!
//! Diacritic stripping maps "café" to "cafe" and "harīṣh" to "harish", so
//! an ASCII query finds accented text. With the `unicode-normalization`
//! feature this is NFD decomposition followed by dropping combining marks.
//! Without it (minimal builds) only precomposed input that is already
//! decomposed loses its marks, which is the best we can do without tables.

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::UnicodeNormalization;

use crate::config::CaseMode;

/// Is this a combining mark (diacritic)?
#[cfg(feature = "unicode-normalization")]
pub fn is_combining_mark(c: char) -> bool {
    unicode_normalization::char::is_combining_mark(c)
}

/// Is this a combining mark (diacritic)?
///
/// Range check over the common combining blocks, for builds without
/// the normalization tables.
#[cfg(not(feature = "unicode-normalization"))]
pub fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1AB0}'..='\u{1AFF}' |  // Combining Diacritical Marks Extended
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

/// Characters that belong to a word. Marks stay attached to their base
/// letter so decomposed input is not split mid-word.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || is_combining_mark(c)
}

/// Remove diacritics.
#[cfg(feature = "unicode-normalization")]
pub fn strip_diacritics(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Remove diacritics (marks already decomposed in the input only).
#[cfg(not(feature = "unicode-normalization"))]
pub fn strip_diacritics(value: &str) -> String {
    value.chars().filter(|c| !is_combining_mark(*c)).collect()
}

/// Apply a case mode.
pub fn fold_case(value: &str, case: CaseMode) -> String {
    match case {
        CaseMode::Insensitive => value.to_lowercase(),
        CaseMode::Upper => value.to_uppercase(),
        CaseMode::Sensitive => value.to_string(),
    }
}
