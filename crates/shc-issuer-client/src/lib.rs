//! # shc-issuer-client -- Issuer key set resolution
//!
//! Fetches the JSON Web Key Set a SMART Health Card issuer publishes at
//! `<iss>/.well-known/jwks.json` and verifies cards against it.
//!
//! Transport failures are retried with exponential backoff. Key sets are
//! cached per issuer URL for a configurable time so that verifying a
//! directory of cards from one issuer costs a single request.

pub mod config;
pub mod error;
pub mod keys;
pub(crate) mod retry;

pub use config::{ConfigError, IssuerClientConfig};
pub use error::IssuerClientError;
pub use keys::IssuerKeyClient;
