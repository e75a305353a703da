//! # Health Card Payload
//!
//! The JWS payload of a SMART Health Card is a JWT-style claim set:
//!
//! ```json
//! {
//!   "iss": "https://issuer.example",
//!   "nbf": 1628099964.297,
//!   "vc": {
//!     "type": ["https://smarthealth.cards#health-card", ...],
//!     "credentialSubject": { "fhirVersion": "4.0.1", "fhirBundle": { ... } }
//!   }
//! }
//! ```
//!
//! [`HealthCard`] pairs the typed payload with the JWS it came from, so the
//! signature can be checked against the exact bytes that were signed.

use serde::{Deserialize, Serialize};

use shc_core::{IssuerUrl, Timestamp};

use crate::error::VcError;
use crate::fhir::FhirBundle;
use crate::jws::CompactJws;

/// Credential type carried by every SMART Health Card.
pub const HEALTH_CARD_TYPE: &str = "https://smarthealth.cards#health-card";

/// Credential type of immunization cards.
pub const IMMUNIZATION_TYPE: &str = "https://smarthealth.cards#immunization";

/// Credential type of COVID-19 cards.
pub const COVID19_TYPE: &str = "https://smarthealth.cards#covid19";

/// The claim set inside a health card JWS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCardPayload {
    /// Issuer base URL.
    pub iss: IssuerUrl,
    /// Issuance time as a NumericDate.
    pub nbf: f64,
    /// Optional expiry as a NumericDate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,
    /// The verifiable credential.
    pub vc: HealthCardCredential,
}

/// The `vc` claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCardCredential {
    /// Credential type URIs.
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    /// The clinical content.
    pub credential_subject: CredentialSubject,
}

/// The `credentialSubject` of a health card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    /// FHIR release of the bundle, e.g. `4.0.1`.
    pub fhir_version: String,
    /// The FHIR bundle.
    pub fhir_bundle: FhirBundle,
}

impl HealthCardPayload {
    /// The issuer URL.
    pub fn issuer(&self) -> &IssuerUrl {
        &self.iss
    }

    /// URL of the issuer's public key set.
    pub fn key_set_url(&self) -> String {
        self.iss.jwks_url()
    }

    /// Issuance time.
    pub fn not_before(&self) -> Result<Timestamp, VcError> {
        Ok(Timestamp::from_epoch_seconds(self.nbf)?)
    }

    /// Expiry time, if the card carries one.
    pub fn expires(&self) -> Result<Option<Timestamp>, VcError> {
        self.exp
            .map(Timestamp::from_epoch_seconds)
            .transpose()
            .map_err(VcError::from)
    }

    /// Whether the credential declares the given type URI.
    pub fn has_type(&self, type_uri: &str) -> bool {
        self.vc.credential_type.iter().any(|t| t == type_uri)
    }

    /// The embedded FHIR bundle.
    pub fn bundle(&self) -> &FhirBundle {
        &self.vc.credential_subject.fhir_bundle
    }
}

/// A decoded health card: its JWS and typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthCard {
    jws: CompactJws,
    payload: HealthCardPayload,
    payload_value: serde_json::Value,
}

impl HealthCard {
    /// Interpret a parsed JWS as a health card.
    pub fn from_jws(jws: CompactJws) -> Result<Self, VcError> {
        let payload_value: serde_json::Value = serde_json::from_str(jws.payload_json())
            .map_err(|e| VcError::InvalidPayload(e.to_string()))?;
        let payload: HealthCardPayload = serde_json::from_value(payload_value.clone())
            .map_err(|e| VcError::InvalidPayload(e.to_string()))?;
        if !payload.has_type(HEALTH_CARD_TYPE) {
            tracing::warn!(iss = %payload.iss, "credential does not declare the health-card type");
        }
        Ok(Self {
            jws,
            payload,
            payload_value,
        })
    }

    /// Decode a card from compact JWS text.
    pub fn from_compact(text: &str) -> Result<Self, VcError> {
        Self::from_jws(CompactJws::parse(text)?)
    }

    /// Decode a card from the text of a single QR code.
    pub fn from_qr_text(text: &str) -> Result<Self, VcError> {
        Self::from_jws(CompactJws::from_qr_text(text)?)
    }

    /// Decode a card from the texts of its QR chunks, in any order.
    pub fn from_qr_chunks<I, S>(texts: I) -> Result<Self, VcError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_jws(CompactJws::from_qr_chunks(texts)?)
    }

    /// The underlying JWS.
    pub fn jws(&self) -> &CompactJws {
        &self.jws
    }

    /// The typed payload.
    pub fn payload(&self) -> &HealthCardPayload {
        &self.payload
    }

    /// The payload as untyped JSON, including members the typed model omits.
    pub fn payload_value(&self) -> &serde_json::Value {
        &self.payload_value
    }

    /// The payload rendered with sorted keys and four-space indentation.
    pub fn pretty_payload(&self) -> Result<String, VcError> {
        self.jws.pretty_payload()
    }
}
