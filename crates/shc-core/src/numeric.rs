//! # QR Numeric Encoding
//!
//! A SMART Health Card QR code carries the text `shc:/` followed by a string
//! of decimal digits. Every pair of digits `dd` stands for the character
//! with code point `dd + 45`, which maps `00..=77` onto `'-'..='z'`, the range
//! covering the base64url alphabet and the `.` separators of a compact JWS.
//!
//! Cards too large for one QR code are split into chunks, each carrying a
//! `shc:/<index>/<total>/` header before its digits. Chunks are reassembled
//! by concatenating their digit strings in index order.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::NumericError;

/// URI prefix of every SMART Health Card QR payload.
pub const SHC_PREFIX: &str = "shc:/";

/// Largest digit string placed in a single QR code before chunking.
///
/// 1195 JWS characters fit a version 22 QR code in numeric mode.
pub const MAX_SINGLE_QR_DIGITS: usize = 1195 * 2;

/// Offset added to every digit pair to obtain a JWS character.
const CHAR_OFFSET: u32 = 45;

/// Largest pair value, mapping to `'z'`.
const MAX_PAIR: u32 = 77;

/// One QR segment of a (possibly chunked) health card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrChunk {
    /// 1-based position of this chunk.
    pub index: u32,
    /// Total number of chunks making up the card.
    pub total: u32,
    /// Numeric payload of this chunk.
    pub digits: String,
}

/// Remove the `shc:/` prefix from `text`, if present.
///
/// Text without the prefix is returned unchanged, so calling this on an
/// already-stripped digit string is a no-op.
pub fn strip_prefix(text: &str) -> &str {
    text.strip_prefix(SHC_PREFIX).unwrap_or(text)
}

/// Decode a numeric QR digit string into compact JWS text.
///
/// # Errors
///
/// - [`NumericError::InvalidCharacters`] if anything other than `0`-`9`
///   appears; every distinct offending character is reported.
/// - [`NumericError::OddLength`] if the digits cannot be paired.
/// - [`NumericError::PairOutOfRange`] if a pair exceeds `77`.
pub fn digits_to_jws(digits: &str) -> Result<String, NumericError> {
    let invalid: BTreeSet<char> = digits.chars().filter(|c| !c.is_ascii_digit()).collect();
    if !invalid.is_empty() {
        return Err(NumericError::InvalidCharacters(invalid));
    }

    let len = digits.len();
    if len % 2 != 0 {
        return Err(NumericError::OddLength(len));
    }

    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(len / 2);
    for (pair_index, pair) in bytes.chunks_exact(2).enumerate() {
        let value = u32::from(pair[0] - b'0') * 10 + u32::from(pair[1] - b'0');
        if value > MAX_PAIR {
            return Err(NumericError::PairOutOfRange {
                position: pair_index * 2,
                value,
            });
        }
        // value <= 77, so value + 45 <= 122 is always an ASCII code point.
        out.push(char::from((value + CHAR_OFFSET) as u8));
    }
    Ok(out)
}

/// Encode compact JWS text as a numeric QR digit string.
///
/// # Errors
///
/// Returns [`NumericError::Unencodable`] for characters outside `'-'..='z'`.
pub fn jws_to_digits(jws: &str) -> Result<String, NumericError> {
    let mut out = String::with_capacity(jws.len() * 2);
    for c in jws.chars() {
        let code = c as u32;
        if !(CHAR_OFFSET..=CHAR_OFFSET + MAX_PAIR).contains(&code) {
            return Err(NumericError::Unencodable(c));
        }
        out.push_str(&format!("{:02}", code - CHAR_OFFSET));
    }
    Ok(out)
}

/// Parse the text of one QR code into a [`QrChunk`].
///
/// Accepts `shc:/<digits>` (chunk 1 of 1), `shc:/<i>/<n>/<digits>`, or a
/// bare digit string. The digits themselves are validated later, when the
/// chunks are assembled.
pub fn parse_chunk(text: &str) -> Result<QrChunk, NumericError> {
    let body = strip_prefix(text);
    let parts: Vec<&str> = body.split('/').collect();
    match parts.as_slice() {
        [digits] => Ok(QrChunk {
            index: 1,
            total: 1,
            digits: (*digits).to_string(),
        }),
        [index, total, digits] => {
            let index: u32 = index
                .parse()
                .map_err(|_| NumericError::MalformedChunk(text.to_string()))?;
            let total: u32 = total
                .parse()
                .map_err(|_| NumericError::MalformedChunk(text.to_string()))?;
            if total == 0 || index == 0 || index > total {
                return Err(NumericError::MalformedChunk(text.to_string()));
            }
            Ok(QrChunk {
                index,
                total,
                digits: (*digits).to_string(),
            })
        }
        _ => Err(NumericError::MalformedChunk(text.to_string())),
    }
}

/// Reassemble chunks (in any order) and decode them to compact JWS text.
pub fn assemble<I>(chunks: I) -> Result<String, NumericError>
where
    I: IntoIterator<Item = QrChunk>,
{
    let mut by_index: BTreeMap<u32, String> = BTreeMap::new();
    let mut total: Option<u32> = None;

    for chunk in chunks {
        match total {
            None => total = Some(chunk.total),
            Some(expected) if expected != chunk.total => {
                return Err(NumericError::ChunkTotalMismatch {
                    expected,
                    found: chunk.total,
                });
            }
            Some(_) => {}
        }
        if by_index.insert(chunk.index, chunk.digits).is_some() {
            return Err(NumericError::DuplicateChunk(chunk.index));
        }
    }

    let total = total.ok_or(NumericError::NoChunks)?;
    if let Some(index) = (1..=total).find(|i| !by_index.contains_key(i)) {
        return Err(NumericError::MissingChunk { index, total });
    }

    let digits: String = by_index.into_values().collect();
    digits_to_jws(&digits)
}

/// Decode the text of a single, unchunked QR code to compact JWS text.
pub fn decode_qr_text(text: &str) -> Result<String, NumericError> {
    assemble([parse_chunk(text)?])
}

/// Encode compact JWS text into one or more `shc:/` QR texts.
///
/// When the digit string exceeds `max_digits`, it is split into the fewest
/// chunks that fit, with lengths balanced so no chunk is much shorter than
/// the others. Chunk lengths are kept even so no digit pair straddles two
/// QR codes.
pub fn split(jws: &str, max_digits: usize) -> Result<Vec<String>, NumericError> {
    if max_digits < 2 {
        return Err(NumericError::ChunkSizeTooSmall);
    }
    let digits = jws_to_digits(jws)?;
    if digits.len() <= max_digits {
        return Ok(vec![format!("{SHC_PREFIX}{digits}")]);
    }

    let pairs = digits.len() / 2;
    let max_pairs = max_digits / 2;
    let count = pairs.div_ceil(max_pairs);
    let per_chunk = pairs.div_ceil(count) * 2;

    // Every byte is an ASCII digit, so byte offsets are char boundaries.
    let parts: Vec<&str> = (0..digits.len())
        .step_by(per_chunk)
        .map(|start| &digits[start..(start + per_chunk).min(digits.len())])
        .collect();
    let total = parts.len();
    Ok(parts
        .iter()
        .enumerate()
        .map(|(i, part)| format!("{SHC_PREFIX}{}/{total}/{part}", i + 1))
        .collect())
}
