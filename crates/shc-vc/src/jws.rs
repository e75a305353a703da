//! # Compact JWS
//!
//! A SMART Health Card is a JWS in compact serialization:
//! `<header>.<payload>.<signature>`, each segment base64url without padding.
//! The payload is compressed with raw DEFLATE (RFC 1951, no zlib header)
//! when the header carries `"zip": "DEF"`.
//!
//! The signature covers the ASCII bytes of `<header>.<payload>` exactly as
//! received, so the original segments are kept alongside their decoded form.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};

use shc_core::{base64url, numeric, KeyId};
use shc_crypto::{Es256Signature, Es256SigningKey};

use crate::error::VcError;

/// Largest inflated payload accepted, in bytes.
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// The only compression algorithm defined for JWS payloads.
pub const DEFLATE: &str = "DEF";

/// The only signature algorithm used by SMART Health Cards.
pub const ES256: &str = "ES256";

/// Protected header of a health card JWS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Payload compression; `"DEF"` for health cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    /// Signature algorithm; `"ES256"` for health cards.
    pub alg: String,
    /// Thumbprint of the signing key in the issuer's key set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Optional media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl JwsHeader {
    /// The `kid` as a validated [`KeyId`].
    pub fn key_id(&self) -> Result<KeyId, VcError> {
        let kid = self.kid.as_deref().ok_or(VcError::MissingKeyId)?;
        Ok(KeyId::new(kid)?)
    }
}

/// A parsed compact JWS.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactJws {
    header_b64: String,
    payload_b64: String,
    signature_b64: String,
    header: JwsHeader,
    header_json: String,
    payload_json: String,
}

impl CompactJws {
    /// Parse compact JWS text, decoding the header and inflating the payload.
    pub fn parse(text: &str) -> Result<Self, VcError> {
        let segments: Vec<&str> = text.split('.').collect();
        let [header_b64, payload_b64, signature_b64] = segments.as_slice() else {
            return Err(VcError::MalformedJws(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };

        let header_json = String::from_utf8(base64url::decode(header_b64)?)
            .map_err(|e| VcError::InvalidHeader(e.to_string()))?;
        let header: JwsHeader = serde_json::from_str(&header_json)
            .map_err(|e| VcError::InvalidHeader(e.to_string()))?;

        let raw_payload = base64url::decode(payload_b64)?;
        let payload_bytes = match header.zip.as_deref() {
            Some(DEFLATE) => inflate(&raw_payload)?,
            Some(other) => return Err(VcError::UnsupportedCompression(other.to_string())),
            None => raw_payload,
        };
        let payload_json = String::from_utf8(payload_bytes)
            .map_err(|e| VcError::InvalidPayload(e.to_string()))?;

        tracing::debug!(
            alg = %header.alg,
            kid = header.kid.as_deref().unwrap_or(""),
            payload_bytes = payload_json.len(),
            "decoded compact JWS"
        );

        Ok(Self {
            header_b64: (*header_b64).to_string(),
            payload_b64: (*payload_b64).to_string(),
            signature_b64: (*signature_b64).to_string(),
            header,
            header_json,
            payload_json,
        })
    }

    /// Decode the text of a single QR code (`shc:/...` or bare digits).
    pub fn from_qr_text(text: &str) -> Result<Self, VcError> {
        Self::parse(&numeric::decode_qr_text(text)?)
    }

    /// Reassemble and decode the texts of a chunked card, in any order.
    pub fn from_qr_chunks<I, S>(texts: I) -> Result<Self, VcError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chunks = texts
            .into_iter()
            .map(|t| numeric::parse_chunk(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::parse(&numeric::assemble(chunks)?)
    }

    /// Compress `payload_json`, sign it, and assemble a compact JWS.
    ///
    /// The header is `{"zip":"DEF","alg":"ES256","kid":<thumbprint>}`.
    pub fn sign(payload_json: &str, key: &Es256SigningKey) -> Result<Self, VcError> {
        let kid = key.verifying_key().to_jwk()?.kid;
        let header = JwsHeader {
            zip: Some(DEFLATE.to_string()),
            alg: ES256.to_string(),
            kid,
            typ: None,
        };
        let header_json = serde_json::to_string(&header)?;
        let header_b64 = base64url::encode(header_json.as_bytes());
        let payload_b64 = base64url::encode(&deflate(payload_json.as_bytes())?);

        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature_b64 = key.sign(signing_input.as_bytes()).to_base64url();

        Ok(Self {
            header_b64,
            payload_b64,
            signature_b64,
            header,
            header_json,
            payload_json: payload_json.to_string(),
        })
    }

    /// The decoded protected header.
    pub fn header(&self) -> &JwsHeader {
        &self.header
    }

    /// The header as the JSON text it was encoded from.
    pub fn header_json(&self) -> &str {
        &self.header_json
    }

    /// The inflated payload as JSON text.
    pub fn payload_json(&self) -> &str {
        &self.payload_json
    }

    /// The payload rendered with sorted keys and four-space indentation.
    ///
    /// Non-ASCII characters are written as `\uXXXX` escapes, so the output
    /// is plain ASCII whatever the names in the card.
    pub fn pretty_payload(&self) -> Result<String, VcError> {
        let value: serde_json::Value = serde_json::from_str(&self.payload_json)
            .map_err(|e| VcError::InvalidPayload(e.to_string()))?;
        let mut out = Vec::new();
        let formatter = AsciiPrettyFormatter(PrettyFormatter::with_indent(b"    "));
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        value.serialize(&mut ser)?;
        String::from_utf8(out).map_err(|e| VcError::InvalidPayload(e.to_string()))
    }

    /// The signature segment, still base64url-encoded.
    pub fn signature_b64(&self) -> &str {
        &self.signature_b64
    }

    /// Decode the signature segment.
    pub fn signature(&self) -> Result<Es256Signature, VcError> {
        Ok(Es256Signature::from_base64url(&self.signature_b64)?)
    }

    /// The bytes covered by the signature: `<header>.<payload>`.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header_b64, self.payload_b64)
    }

    /// Re-serialize in compact form.
    pub fn to_compact(&self) -> String {
        format!(
            "{}.{}.{}",
            self.header_b64, self.payload_b64, self.signature_b64
        )
    }
}

impl std::fmt::Display for CompactJws {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_compact())
    }
}

/// Pretty printing that escapes every non-ASCII character as UTF-16
/// `\uXXXX` units.
struct AsciiPrettyFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiPrettyFormatter<'_> {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> std::io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> std::io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> std::io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> std::io::Result<()> {
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

fn inflate(compressed: &[u8]) -> Result<Vec<u8>, VcError> {
    let mut out = Vec::new();
    DeflateDecoder::new(compressed)
        .take(MAX_PAYLOAD_BYTES as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| VcError::Inflate(e.to_string()))?;
    if out.len() > MAX_PAYLOAD_BYTES {
        return Err(VcError::PayloadTooLarge(MAX_PAYLOAD_BYTES));
    }
    Ok(out)
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>, VcError> {
    deflate_into(Vec::new(), bytes)
}

fn deflate_into<W: Write>(sink: W, bytes: &[u8]) -> Result<W, VcError> {
    let mut encoder = DeflateEncoder::new(sink, Compression::best());
    encoder
        .write_all(bytes)
        .map_err(|e| VcError::Deflate(e.to_string()))?;
    encoder.finish().map_err(|e| VcError::Deflate(e.to_string()))
}
