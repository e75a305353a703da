//! # Validate Subcommand
//!
//! Reads one card from an image and verifies its signature. A valid card's
//! payload is printed; an invalid one produces a warning and exit code 1.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use shc_vc::{HealthCard, VerificationOutcome};

use crate::{qr_image, KeySource};

/// Arguments for the `shc validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Image file containing a single SMART Health Card QR code.
    #[arg(value_name = "QR_IMAGE")]
    pub qr_image: PathBuf,
}

/// Execute the validate subcommand.
pub async fn run_validate(args: &ValidateArgs, keys: &KeySource, out: &mut impl Write) -> Result<u8> {
    let path = &args.qr_image;
    let text = qr_image::read_qr_text(path)?;
    let card = HealthCard::from_qr_text(&text)
        .with_context(|| format!("failed to decode card in {}", path.display()))?;

    match keys.check(&card).await {
        VerificationOutcome::Valid => {
            writeln!(out, "Card found in {} and is valid.", path.display())?;
            writeln!(out, "{}", card.pretty_payload()?)?;
            Ok(0)
        }
        VerificationOutcome::Invalid(reason) => {
            tracing::warn!(%reason, "WARNING: Card found in {} is NOT valid.", path.display());
            Ok(1)
        }
    }
}
