//! Error types for card decoding, verification, and summarization.

use shc_core::{Base64Error, NumericError, ValidationError};
use shc_crypto::CryptoError;
use thiserror::Error;

/// Errors from decoding and verifying a health card.
#[derive(Error, Debug)]
pub enum VcError {
    /// The QR text could not be turned into JWS text.
    #[error("QR decode failed: {0}")]
    Numeric(#[from] NumericError),

    /// A JWS segment was not valid base64url.
    #[error("JWS segment decode failed: {0}")]
    Base64(#[from] Base64Error),

    /// The text is not a three-segment compact JWS.
    #[error("malformed JWS: {0}")]
    MalformedJws(String),

    /// The JWS header is not valid JSON or lacks required members.
    #[error("invalid JWS header: {0}")]
    InvalidHeader(String),

    /// The header names a compression algorithm other than `DEF`.
    #[error("unsupported payload compression \"{0}\"")]
    UnsupportedCompression(String),

    /// The payload could not be inflated.
    #[error("payload inflate failed: {0}")]
    Inflate(String),

    /// The payload could not be compressed for signing.
    #[error("payload deflate failed: {0}")]
    Deflate(String),

    /// The inflated payload exceeds the size cap.
    #[error("inflated payload exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// The payload is not a valid health card claim set.
    #[error("invalid card payload: {0}")]
    InvalidPayload(String),

    /// The header names a signature algorithm other than `ES256`.
    #[error("unsupported signature algorithm \"{0}\"")]
    UnsupportedAlgorithm(String),

    /// The header carries no `kid`.
    #[error("JWS header has no key ID")]
    MissingKeyId,

    /// The verification key could not be resolved.
    #[error("key resolution failed: {0}")]
    KeyResolution(String),

    /// The card's `exp` claim lies in the past.
    #[error("card expired at {0}")]
    Expired(String),

    /// Key selection or signature verification failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A claim failed identifier or timestamp validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Vaccine-name overrides could not be parsed.
    #[error("invalid vaccine name table: {0}")]
    VaccineNames(#[from] serde_yaml::Error),
}

/// Errors from summarizing a card's FHIR bundle.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// The bundle has no Patient resource.
    #[error("no patient found in bundle")]
    NoPatient,

    /// The bundle has more than one Patient resource.
    #[error("multiple patients in bundle")]
    MultiplePatients,

    /// The bundle has no Immunization resources.
    #[error("no immunizations found in bundle")]
    NoImmunizations,

    /// The bundle contains a resource type the summary does not cover.
    #[error("unknown entry type \"{0}\" in bundle")]
    UnsupportedResource(String),

    /// An immunization refers to someone other than the bundle patient.
    #[error("patient for immunization #{index} is not the bundle patient (reference {reference:?})")]
    PatientMismatch {
        /// 1-based position among the bundle's immunizations.
        index: usize,
        /// The reference found on the immunization.
        reference: Option<String>,
    },

    /// A member required for the summary is absent.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// A resource did not match the FHIR shape for its type.
    #[error("invalid {resource_type} resource: {source}")]
    InvalidResource {
        /// The declared resource type.
        resource_type: String,
        /// The deserialization failure.
        source: serde_json::Error,
    },
}
