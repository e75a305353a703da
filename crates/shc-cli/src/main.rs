//! # shc CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shc_cli::decode::{run_decode, DecodeArgs};
use shc_cli::extract::{run_extract, ExtractArgs};
use shc_cli::validate::{run_validate, ValidateArgs};
use shc_cli::KeySource;

/// SMART Health Card reader.
///
/// Decodes the `shc:/` QR codes of SMART Health Cards, verifies their ES256
/// signatures against the issuer's published keys, and summarizes the
/// vaccination records they carry.
#[derive(Parser, Debug)]
#[command(name = "shc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Verify against this JWKS file instead of fetching issuer keys.
    #[arg(long, global = true, value_name = "FILE")]
    jwks: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode QR text and print the JWS header, payload, and signature.
    Decode(DecodeArgs),

    /// Verify the card in an image and print its contents.
    Validate(ValidateArgs),

    /// Summarize a directory of card images as tab-separated rows.
    Extract(ExtractArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level. RUST_LOG wins when set.
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("shc CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Decode(args) => run_decode(args, std::io::stdin().lock(), &mut stdout),
        Commands::Validate(args) => match KeySource::from_args(cli.jwks.as_deref()) {
            Ok(keys) => run_validate(args, &keys, &mut stdout).await,
            Err(e) => Err(e),
        },
        Commands::Extract(args) => match KeySource::from_args(cli.jwks.as_deref()) {
            Ok(keys) => run_extract(args, &keys, &mut stdout).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
