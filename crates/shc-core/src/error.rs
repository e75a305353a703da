//! # Error Hierarchy
//!
//! Structured error types for the decoding layer, built with `thiserror`.
//!
//! Each error carries enough of the offending input to diagnose a bad scan
//! without re-running the decoder.

use std::collections::BTreeSet;

use thiserror::Error;

/// Errors while converting between `shc:/` numeric text and compact JWS text.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NumericError {
    /// The digit string contained characters other than `0`-`9`.
    #[error("invalid characters found (non-numeric): {}", format_chars(.0))]
    InvalidCharacters(BTreeSet<char>),

    /// Digits are consumed in pairs, so the length must be even.
    #[error("odd number of characters ({0}) in input")]
    OddLength(usize),

    /// A digit pair decodes outside the compact-JWS alphabet (`'-'..='z'`).
    #[error("digit pair {value:02} at offset {position} is outside the range 00-77")]
    PairOutOfRange {
        /// Byte offset of the pair in the digit string.
        position: usize,
        /// The decoded pair value.
        value: u32,
    },

    /// A JWS character cannot be represented as a digit pair.
    #[error("character {0:?} cannot be numerically encoded")]
    Unencodable(char),

    /// A chunked QR header (`shc:/<i>/<n>/...`) was malformed.
    #[error("malformed chunk header: \"{0}\"")]
    MalformedChunk(String),

    /// Chunks disagree on the total chunk count.
    #[error("chunk total mismatch: expected {expected}, found {found}")]
    ChunkTotalMismatch {
        /// Total declared by the first chunk.
        expected: u32,
        /// Conflicting total.
        found: u32,
    },

    /// The same chunk index was supplied twice.
    #[error("duplicate chunk {0}")]
    DuplicateChunk(u32),

    /// A chunk index in `1..=total` is missing.
    #[error("missing chunk {index} of {total}")]
    MissingChunk {
        /// The absent index.
        index: u32,
        /// Declared total.
        total: u32,
    },

    /// No chunks were supplied.
    #[error("no QR chunks supplied")]
    NoChunks,

    /// A split was requested with room for less than one digit pair.
    #[error("chunk size must hold at least one digit pair")]
    ChunkSizeTooSmall,
}

fn format_chars(chars: &BTreeSet<char>) -> String {
    let quoted: Vec<String> = chars.iter().map(|c| format!("{c:?}")).collect();
    format!("{{{}}}", quoted.join(", "))
}

/// Errors from base64url decoding of JWS segments and JWK members.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Base64Error {
    /// The input was not valid URL-safe base64.
    #[error("invalid base64url input: {0}")]
    Invalid(String),
}

/// Validation errors for identifier newtypes and timestamps.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Issuer URL is empty or not an absolute http(s) URL.
    #[error("invalid issuer URL: \"{value}\" ({reason})")]
    InvalidIssuer {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Key identifier is empty.
    #[error("invalid key ID: must be non-empty")]
    InvalidKeyId,

    /// NumericDate value is not a representable instant.
    #[error("invalid timestamp: {value} ({reason})")]
    InvalidTimestamp {
        /// The rejected NumericDate.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
