#![deny(missing_docs)]

//! # shc-core — Foundational Types for the SMART Health Card Reader
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **QR text decoding is total.** [`numeric::digits_to_jws`] either returns
//!    a string made only of characters from the compact-JWS alphabet or a
//!    [`NumericError`] naming the offending input. No partial output.
//!
//! 2. **Newtype wrappers for identifiers.** An [`IssuerUrl`] is validated at
//!    construction and is the only way to derive a key-set URL. A [`KeyId`]
//!    cannot be confused with an arbitrary string.
//!
//! 3. **Structured errors.** One `thiserror` enum per concern
//!    ([`NumericError`], [`Base64Error`], [`ValidationError`]), no
//!    `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod base64url;
pub mod error;
pub mod identity;
pub mod numeric;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{Base64Error, NumericError, ValidationError};
pub use identity::{IssuerUrl, KeyId};
pub use numeric::{QrChunk, MAX_SINGLE_QR_DIGITS, SHC_PREFIX};
pub use temporal::Timestamp;
