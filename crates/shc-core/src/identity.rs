//! # Identifier Newtypes
//!
//! [`IssuerUrl`] is the `iss` claim of a health card: the base URL under
//! which the issuer publishes its key set. [`KeyId`] is the `kid` header of
//! a JWS, naming one key in that set.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;

/// Path, relative to the issuer URL, of the published JSON Web Key Set.
pub const JWKS_PATH: &str = ".well-known/jwks.json";

/// The `iss` claim of a health card.
///
/// Must be an absolute `http` or `https` URL. The string form is kept
/// exactly as issued, because it is compared against trust lists verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssuerUrl(String);

impl IssuerUrl {
    /// Validate and wrap an issuer URL.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::InvalidIssuer {
                value,
                reason: "must be non-empty".to_string(),
            });
        }
        let parsed = Url::parse(&value).map_err(|e| ValidationError::InvalidIssuer {
            value: value.clone(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "https" | "http" => Ok(Self(value)),
            other => Err(ValidationError::InvalidIssuer {
                reason: format!("unsupported scheme \"{other}\""),
                value,
            }),
        }
    }

    /// The issuer URL as issued.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of the issuer's JSON Web Key Set: `{iss}/.well-known/jwks.json`.
    ///
    /// A single trailing `/` on the issuer is dropped before joining.
    pub fn jwks_url(&self) -> String {
        let base = self.0.strip_suffix('/').unwrap_or(&self.0);
        format!("{base}/{JWKS_PATH}")
    }
}

impl std::fmt::Display for IssuerUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IssuerUrl {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IssuerUrl> for String {
    fn from(value: IssuerUrl) -> Self {
        value.0
    }
}

/// The `kid` header of a JWS.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    /// Wrap a non-empty key identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::InvalidKeyId);
        }
        Ok(Self(value))
    }

    /// The key identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for KeyId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KeyId> for String {
    fn from(value: KeyId) -> Self {
        value.0
    }
}
