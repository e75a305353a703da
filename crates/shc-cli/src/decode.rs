//! # Decode Subcommand
//!
//! Decodes SMART Health Card QR text and prints the JWS parts. No
//! signature check is made.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use shc_vc::CompactJws;

use crate::qr_image;

/// Arguments for the `shc decode` subcommand.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// QR texts (`shc:/...`). Several texts are read as the chunks of one
    /// card. With none, texts are read from stdin, one per line.
    #[arg(value_name = "TEXT", conflicts_with = "image")]
    pub texts: Vec<String>,

    /// Read the QR text from an image file instead.
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,
}

/// Execute the decode subcommand.
pub fn run_decode(args: &DecodeArgs, input: impl BufRead, out: &mut impl Write) -> Result<u8> {
    if let Some(path) = &args.image {
        let text = qr_image::read_qr_text(path)?;
        let jws = CompactJws::from_qr_text(&text)
            .with_context(|| format!("failed to decode card in {}", path.display()))?;
        print_jws(&jws, out)?;
        return Ok(0);
    }

    match args.texts.as_slice() {
        [] => decode_lines(input, out),
        [text] => {
            print_jws(&CompactJws::from_qr_text(text)?, out)?;
            Ok(0)
        }
        chunks => {
            print_jws(&CompactJws::from_qr_chunks(chunks)?, out)?;
            Ok(0)
        }
    }
}

/// Decode each non-blank line as a separate card.
fn decode_lines(input: impl BufRead, out: &mut impl Write) -> Result<u8> {
    let mut failures = 0usize;
    for (n, raw) in input.split(b'\n').enumerate() {
        let raw = raw.context("failed to read stdin")?;
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line.trim(),
            Err(e) => {
                failures += 1;
                tracing::error!(line = n + 1, "QR text is not valid UTF-8: {e}");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        match CompactJws::from_qr_text(line) {
            Ok(jws) => print_jws(&jws, out)?,
            Err(e) => {
                failures += 1;
                tracing::error!(line = n + 1, "could not decode QR text: {e}");
            }
        }
    }
    Ok(u8::from(failures > 0))
}

/// Print the header, payload, pretty payload, and signature of a JWS.
pub fn print_jws(jws: &CompactJws, out: &mut impl Write) -> Result<()> {
    writeln!(out, "JWS Header: {}", jws.header_json())?;
    writeln!(out, "JWS Payload: {}", jws.payload_json())?;
    writeln!(out, "{}", jws.pretty_payload()?)?;
    writeln!(out, "JWS Signature: {}", jws.signature_b64())?;
    Ok(())
}
