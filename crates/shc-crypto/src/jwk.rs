//! # JSON Web Keys
//!
//! Issuers publish their signing keys as a JSON Web Key Set at
//! `{iss}/.well-known/jwks.json`. A verifier only trusts a key from that
//! set when it is an EC key on P-256, marked for signatures with ES256, and
//! carries no private material.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use shc_core::base64url;

use crate::error::CryptoError;

/// A single JSON Web Key.
///
/// All members are optional at the serde level: issuers publish key sets
/// containing key types this reader does not use, and those must parse so
/// they can be skipped. Unknown members are ignored.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (`"EC"` for SMART Health Cards).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,
    /// Key identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Intended use (`"sig"`).
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// Algorithm (`"ES256"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Curve (`"P-256"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// Base64url x coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Base64url y coordinate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Base64url private scalar. Present only in private keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl std::fmt::Debug for Jwk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("kid", &self.kid)
            .field("use", &self.key_use)
            .field("alg", &self.alg)
            .field("crv", &self.crv)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("d", &self.d.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Jwk {
    /// Whether this key may be used to verify a SMART Health Card.
    pub fn is_es256_verification_key(&self) -> bool {
        self.kty.as_deref() == Some("EC")
            && self.key_use.as_deref() == Some("sig")
            && self.alg.as_deref() == Some("ES256")
            && self.crv.as_deref() == Some("P-256")
            && self.d.is_none()
    }

    /// A copy of this key with the private scalar removed.
    pub fn to_public(&self) -> Jwk {
        Jwk {
            d: None,
            ..self.clone()
        }
    }
}

/// A JSON Web Key Set: `{"keys": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// The published keys.
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Parse a key set document. A document without `"keys"` is rejected.
    pub fn from_json(json: &str) -> Result<Self, CryptoError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Find the verification key for `kid`.
    ///
    /// Returns the first key whose `kid` matches and which passes
    /// [`Jwk::is_es256_verification_key`]. Matching keys that fail those
    /// checks are skipped, not reported.
    pub fn find_verification_key(&self, kid: &str) -> Result<&Jwk, CryptoError> {
        self.keys
            .iter()
            .filter(|k| k.kid.as_deref() == Some(kid))
            .find(|k| k.is_es256_verification_key())
            .ok_or_else(|| CryptoError::KeyNotFound(kid.to_string()))
    }
}

/// RFC 7638 SHA-256 thumbprint of an EC key, base64url-encoded.
///
/// The hash input is the required members `crv`, `kty`, `x`, `y` in
/// lexicographic order with no whitespace.
pub fn jwk_thumbprint(jwk: &Jwk) -> Result<String, CryptoError> {
    let member = |name: &str, value: &Option<String>| {
        value
            .clone()
            .ok_or_else(|| CryptoError::InvalidPublicKey(format!("missing member \"{name}\"")))
    };
    let crv = member("crv", &jwk.crv)?;
    let kty = member("kty", &jwk.kty)?;
    let x = member("x", &jwk.x)?;
    let y = member("y", &jwk.y)?;
    // serde_json maps keep keys sorted, which gives the RFC 7638 member order.
    let canonical = serde_json::json!({ "crv": crv, "kty": kty, "x": x, "y": y });
    let canonical = serde_json::to_string(&canonical)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    Ok(base64url::encode(&Sha256::digest(canonical.as_bytes())))
}
