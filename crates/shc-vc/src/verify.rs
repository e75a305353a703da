//! # Signature Verification
//!
//! A card is valid when its ES256 signature over `<header>.<payload>`
//! verifies under the issuer key named by the header's `kid`, and its
//! `exp` claim (if any) has not passed.

use shc_core::{IssuerUrl, KeyId, Timestamp};
use shc_crypto::{Es256VerifyingKey, JwkSet};

use crate::credential::HealthCard;
use crate::error::VcError;
use crate::jws::ES256;

/// Result of checking a card, for callers that only report validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The signature verified and the card has not expired.
    Valid,
    /// Verification failed; the reason is a display string.
    Invalid(String),
}

impl VerificationOutcome {
    /// Whether the outcome is [`VerificationOutcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<Result<(), VcError>> for VerificationOutcome {
    fn from(result: Result<(), VcError>) -> Self {
        match result {
            Ok(()) => Self::Valid,
            Err(e) => Self::Invalid(e.to_string()),
        }
    }
}

impl HealthCard {
    /// The `kid` from the JWS header.
    pub fn key_id(&self) -> Result<KeyId, VcError> {
        self.jws().header().key_id()
    }

    /// Verify against a key already in hand.
    pub fn verify_with_key(&self, key: &Es256VerifyingKey) -> Result<(), VcError> {
        self.verify_with_key_at(key, Timestamp::now())
    }

    /// Verify against a key, judging expiry as of `now`.
    pub fn verify_with_key_at(
        &self,
        key: &Es256VerifyingKey,
        now: Timestamp,
    ) -> Result<(), VcError> {
        let alg = &self.jws().header().alg;
        if alg != ES256 {
            return Err(VcError::UnsupportedAlgorithm(alg.clone()));
        }
        if let Some(exp) = self.payload().expires()? {
            if exp <= now {
                return Err(VcError::Expired(exp.to_string()));
            }
        }
        let signature = self.jws().signature()?;
        key.verify(self.jws().signing_input().as_bytes(), &signature)?;
        tracing::debug!(iss = %self.payload().iss, "card signature verified");
        Ok(())
    }

    /// Select the header's key from an issuer key set and verify.
    pub fn verify_against(&self, keys: &JwkSet) -> Result<(), VcError> {
        let kid = self.key_id()?;
        let jwk = keys.find_verification_key(kid.as_str())?;
        let key = Es256VerifyingKey::from_jwk(jwk)?;
        self.verify_with_key(&key)
    }

    /// Verify using a resolver that maps issuer and key ID to a public key.
    pub fn verify<F>(&self, resolve: F) -> Result<(), VcError>
    where
        F: FnOnce(&IssuerUrl, &KeyId) -> Result<Es256VerifyingKey, String>,
    {
        let kid = self.key_id()?;
        let key = resolve(self.payload().issuer(), &kid).map_err(VcError::KeyResolution)?;
        self.verify_with_key(&key)
    }

    /// Like [`HealthCard::verify_against`], folding failures into an outcome.
    pub fn check(&self, keys: &JwkSet) -> VerificationOutcome {
        let outcome = VerificationOutcome::from(self.verify_against(keys));
        if let VerificationOutcome::Invalid(reason) = &outcome {
            tracing::info!(iss = %self.payload().iss, %reason, "card failed verification");
        }
        outcome
    }
}
