//! # shc-vc — SMART Health Card Credentials
//!
//! Turns the compact JWS carried by a SMART Health Card into typed data and
//! checks its signature. Provides:
//!
//! - **Compact JWS** ([`CompactJws`]) with base64url segments and a
//!   raw-DEFLATE payload (`zip: DEF`).
//! - **Card payload** ([`HealthCardPayload`], [`HealthCard`]): the `iss`,
//!   `nbf` and `vc` claims wrapping a FHIR bundle.
//! - **FHIR bundle model** ([`FhirBundle`], [`Patient`], [`Immunization`]).
//! - **ES256 verification** against an issuer [`JwkSet`](shc_crypto::JwkSet).
//! - **Card summaries** ([`CardSummary`]) naming the patient and doses, with
//!   vaccine names from a [`VaccineRegistry`].
//! - **Issuance** ([`issue`]): compress, sign, and numerically encode a
//!   payload into `shc:/` QR texts.
//!
//! ## Security Invariants
//!
//! - The signing input is always the two base64url segments exactly as
//!   received, never a re-serialization of the decoded JSON.
//! - Inflated payloads are capped at [`MAX_PAYLOAD_BYTES`].
//! - Only ES256 keys passing the key-set selection rules are used.

pub mod credential;
pub mod error;
pub mod fhir;
pub mod issue;
pub mod jws;
pub mod summary;
pub mod vaccine;
pub mod verify;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export primary types.
pub use credential::{
    CredentialSubject, HealthCard, HealthCardCredential, HealthCardPayload, COVID19_TYPE,
    HEALTH_CARD_TYPE, IMMUNIZATION_TYPE,
};
pub use error::{SummaryError, VcError};
pub use fhir::{
    BundleEntry, CodeableConcept, Coding, FhirBundle, HumanName, Immunization, Patient,
    Performer, Reference, Resource,
};
pub use issue::{qr_texts, CardIssuer, FHIR_VERSION};
pub use jws::{CompactJws, JwsHeader, MAX_PAYLOAD_BYTES};
pub use summary::{CardSummary, DoseSummary, UNKNOWN_PERFORMER};
pub use vaccine::{VaccineRegistry, CVX_SYSTEM};
pub use verify::VerificationOutcome;
