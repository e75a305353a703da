//! # shc-crypto — Cryptographic Primitives for SMART Health Cards
//!
//! This crate provides the key handling and signature scheme used by
//! SMART Health Cards:
//!
//! - **JSON Web Keys** ([`Jwk`], [`JwkSet`]) as published by issuers at
//!   `/.well-known/jwks.json`, with the selection rules a verifier applies
//!   before trusting a key.
//! - **ES256** signing and verification (ECDSA over P-256 with SHA-256)
//!   via the `p256` crate.
//! - **RFC 7638 thumbprints**, which SMART Health Card issuers use as `kid`.

pub mod error;
pub mod es256;
pub mod jwk;

// Re-export primary types.
pub use error::CryptoError;
pub use es256::{Es256Signature, Es256SigningKey, Es256VerifyingKey};
pub use jwk::{jwk_thumbprint, Jwk, JwkSet};
