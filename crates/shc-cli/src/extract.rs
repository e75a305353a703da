//! # Extract Subcommand
//!
//! Summarizes every card image in a directory as one tab-separated row:
//!
//! ```text
//! <file>  <given>  <family>  <birthDate>  <date1>  <performer1>  <vaccine1>  [<date2>  <performer2>  <vaccine2>]
//! ```
//!
//! A card that cannot be read, fails verification, or cannot be summarized
//! yields `<file>  INVALID`; the reason is logged at warn level.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use shc_vc::{CardSummary, HealthCard, VaccineRegistry, VerificationOutcome};

use crate::{qr_image, KeySource};

/// Image extensions scanned, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["bmp", "jpg", "jpeg", "png"];

/// Row marker for cards that fail.
pub const INVALID: &str = "INVALID";

/// Arguments for the `shc extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory of card images.
    #[arg(value_name = "QR_DIR")]
    pub qr_dir: PathBuf,

    /// YAML file of extra vaccine names (`system -> code -> name`).
    #[arg(long, value_name = "YAML")]
    pub vaccine_names: Option<PathBuf>,
}

/// Execute the extract subcommand.
pub async fn run_extract(args: &ExtractArgs, keys: &KeySource, out: &mut impl Write) -> Result<u8> {
    let mut registry = VaccineRegistry::default();
    if let Some(path) = &args.vaccine_names {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read vaccine names: {}", path.display()))?;
        registry
            .merge_yaml(&yaml)
            .with_context(|| format!("invalid vaccine names: {}", path.display()))?;
    }

    let files = card_images(&args.qr_dir)?;
    tracing::info!(dir = %args.qr_dir.display(), files = files.len(), "extracting cards");

    for file in files {
        let mut row = vec![file.display().to_string()];
        match summarize(&file, keys, &registry).await {
            Ok(fields) => row.extend(fields),
            Err(e) => {
                tracing::warn!(file = %file.display(), "{e:#}");
                row.push(INVALID.to_string());
            }
        }
        writeln!(out, "{}", row.join("\t"))?;
    }
    Ok(0)
}

async fn summarize(file: &Path, keys: &KeySource, registry: &VaccineRegistry) -> Result<Vec<String>> {
    let text = qr_image::read_qr_text(file)?;
    let card = HealthCard::from_qr_text(&text).context("could not extract JWS data")?;
    if let VerificationOutcome::Invalid(reason) = keys.check(&card).await {
        anyhow::bail!("card is not valid: {reason}");
    }
    let summary = CardSummary::from_bundle(card.payload().bundle(), registry)?;
    Ok(summary.tsv_fields())
}

/// Regular files in `dir` with an image extension, sorted by name.
pub fn card_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}
