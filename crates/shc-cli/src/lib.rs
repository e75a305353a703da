//! # shc-cli — CLI Tool for SMART Health Cards
//!
//! Provides the `shc` command-line interface.
//!
//! ## Subcommands
//!
//! - `shc decode` — Decode QR text and print the JWS header, payload, and
//!   signature.
//! - `shc validate` — Read a card from an image, verify it against the
//!   issuer's keys, and print its payload.
//! - `shc extract` — Summarize every card image in a directory as TSV.
//!
//! ```bash
//! shc decode 'shc:/5676290952432060346029243740...'
//! shc validate card.png
//! shc extract cards/ > vaccinations.tsv
//! shc --jwks issuer-jwks.json validate card.png
//! ```

pub mod decode;
pub mod extract;
pub mod qr_image;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use shc_crypto::JwkSet;
use shc_issuer_client::{IssuerClientConfig, IssuerKeyClient};
use shc_vc::{HealthCard, VerificationOutcome};

/// Where verification keys come from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// A key set loaded from a local file; no network access.
    Offline(JwkSet),
    /// Each card's issuer, fetched over HTTPS.
    Issuer(IssuerKeyClient),
}

impl KeySource {
    /// Use the key set in `jwks` if given, otherwise fetch from issuers.
    pub fn from_args(jwks: Option<&Path>) -> Result<Self> {
        match jwks {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read key set: {}", path.display()))?;
                let keys = JwkSet::from_json(&json)
                    .with_context(|| format!("invalid key set: {}", path.display()))?;
                tracing::debug!(path = %path.display(), keys = keys.keys.len(), "using offline key set");
                Ok(Self::Offline(keys))
            }
            None => {
                let config = IssuerClientConfig::from_env()?;
                Ok(Self::Issuer(IssuerKeyClient::new(&config)?))
            }
        }
    }

    /// Verify a card, folding every failure into the outcome.
    pub async fn check(&self, card: &HealthCard) -> VerificationOutcome {
        match self {
            Self::Offline(keys) => card.check(keys),
            Self::Issuer(client) => client.check_card(card).await,
        }
    }
}
