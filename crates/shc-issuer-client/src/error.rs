//! Key set client error types.

use shc_crypto::CryptoError;
use shc_vc::VcError;

/// Errors from resolving issuer keys and verifying cards with them.
#[derive(Debug, thiserror::Error)]
pub enum IssuerClientError {
    /// HTTP transport error after retries.
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        /// The key set URL.
        url: String,
        /// The transport failure.
        source: reqwest::Error,
    },
    /// The issuer answered with a non-2xx status.
    #[error("{url} returned {status}: {body}")]
    ApiError {
        /// The key set URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The response body is not a JSON Web Key Set.
    #[error("invalid key set at {url}: {source}")]
    InvalidKeySet {
        /// The key set URL.
        url: String,
        /// The parse failure.
        source: CryptoError,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    /// The card failed to verify against the fetched keys.
    #[error(transparent)]
    Vc(#[from] VcError),
}
