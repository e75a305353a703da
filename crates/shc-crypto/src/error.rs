//! # Cryptographic Error Types
//!
//! Structured errors for key handling and ES256 operations.

use shc_core::Base64Error;
use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The key set document could not be parsed.
    #[error("invalid key set: {0}")]
    InvalidKeySet(#[from] serde_json::Error),

    /// No usable ES256 verification key with this `kid` exists in the set.
    #[error("no public key with key ID '{0}' found")]
    KeyNotFound(String),

    /// A JWK does not describe a valid P-256 public key.
    #[error("invalid P-256 public key: {0}")]
    InvalidPublicKey(String),

    /// A JWK does not carry a valid P-256 private scalar.
    #[error("invalid P-256 private key: {0}")]
    InvalidPrivateKey(String),

    /// ES256 signatures are exactly 64 bytes (`r || s`).
    #[error("invalid ES256 signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// The signature bytes are not a valid ECDSA signature encoding.
    #[error("invalid ES256 signature: {0}")]
    InvalidSignature(String),

    /// ES256 signature verification failed.
    #[error("ES256 verification failed: {0}")]
    VerificationFailed(String),

    /// A base64url member could not be decoded.
    #[error(transparent)]
    Base64(#[from] Base64Error),
}
