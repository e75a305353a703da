//! # Card Issuance
//!
//! Produces signed health cards and their QR texts. An issuer holds one
//! ES256 signing key and publishes the matching public key at
//! `<iss>/.well-known/jwks.json`.

use shc_core::{numeric, IssuerUrl, Timestamp};
use shc_crypto::{Es256SigningKey, JwkSet};

use crate::credential::{
    CredentialSubject, HealthCard, HealthCardCredential, HealthCardPayload, COVID19_TYPE,
    HEALTH_CARD_TYPE, IMMUNIZATION_TYPE,
};
use crate::error::VcError;
use crate::fhir::FhirBundle;
use crate::jws::CompactJws;

/// FHIR release written into issued cards.
pub const FHIR_VERSION: &str = "4.0.1";

/// Signs health cards on behalf of one issuer.
#[derive(Debug)]
pub struct CardIssuer {
    issuer: IssuerUrl,
    key: Es256SigningKey,
}

impl CardIssuer {
    /// Create an issuer from its base URL and signing key.
    pub fn new(issuer: IssuerUrl, key: Es256SigningKey) -> Self {
        Self { issuer, key }
    }

    /// The issuer base URL.
    pub fn issuer(&self) -> &IssuerUrl {
        &self.issuer
    }

    /// The public key set to publish at the issuer's JWKS URL.
    pub fn key_set(&self) -> Result<JwkSet, VcError> {
        Ok(JwkSet {
            keys: vec![self.key.verifying_key().to_jwk()?],
        })
    }

    /// An immunization card payload for `bundle`, issued at `issued_at`.
    pub fn payload(&self, bundle: FhirBundle, issued_at: Timestamp) -> HealthCardPayload {
        HealthCardPayload {
            iss: self.issuer.clone(),
            nbf: issued_at.to_epoch_seconds(),
            exp: None,
            vc: HealthCardCredential {
                credential_type: [HEALTH_CARD_TYPE, IMMUNIZATION_TYPE, COVID19_TYPE]
                    .iter()
                    .map(|t| t.to_string())
                    .collect(),
                credential_subject: CredentialSubject {
                    fhir_version: FHIR_VERSION.to_string(),
                    fhir_bundle: bundle,
                },
            },
        }
    }

    /// Sign a payload.
    pub fn issue(&self, payload: &HealthCardPayload) -> Result<HealthCard, VcError> {
        let payload_json = serde_json::to_string(payload)?;
        let jws = CompactJws::sign(&payload_json, &self.key)?;
        tracing::info!(
            iss = %self.issuer,
            kid = jws.header().kid.as_deref().unwrap_or(""),
            "issued health card"
        );
        HealthCard::from_jws(jws)
    }
}

/// The `shc:/` QR texts for a card, chunked when longer than `max_digits`.
pub fn qr_texts(card: &HealthCard, max_digits: usize) -> Result<Vec<String>, VcError> {
    Ok(numeric::split(&card.jws().to_compact(), max_digits)?)
}
