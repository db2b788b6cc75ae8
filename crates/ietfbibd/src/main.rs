//! Command line interface for the ietfbib bibliographic resolver.
//!
//! Two surfaces over the library:
//!
//! ```bash
//! # Resolve one citation and print it
//! ietfbib get "RFC 8341"
//! ietfbib get --format bibxml "I-D.draft-abarth-cake-02"
//!
//! # Export a whole corpus into a directory
//! ietfbib fetch ietf-rfc-entries --output data --format yaml
//! ```
//!
//! Verbosity is controlled with `-v`/`-vv`/`-vvv`, or the `RUST_LOG`
//! environment variable when set.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, process::ExitCode, str::FromStr};

use clap::{builder::ArgAction, Parser, Subcommand};
use ietfbib::{
  bibliography::IetfBibliography,
  data_fetcher::{DataFetcher, DataSource},
  render::OutputFormat,
};
use tracing_subscriber::EnvFilter;

pub mod error;

use crate::error::*;

/// Command line interface configuration and argument parsing.
#[derive(Parser)]
#[command(author, version, about = "Bibliographic metadata resolver for IETF documents")]
struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail.
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  /// The subcommand to execute.
  #[command(subcommand)]
  command: Commands,
}

/// Available CLI operations.
#[derive(Subcommand)]
enum Commands {
  /// Resolve one citation and print the rendered record.
  Get {
    /// Citation text, e.g. "RFC 8341" or "I-D.draft-abarth-cake-02".
    reference: String,

    /// Output format.
    #[arg(long, short, default_value = "yaml")]
    format: String,
  },
  /// Export a document corpus into a directory.
  Fetch {
    /// Source to export: ietf-rfcsubseries, ietf-internet-drafts, or
    /// ietf-rfc-entries.
    source: String,

    /// Output directory.
    #[arg(long, short, default_value = "data")]
    output: PathBuf,

    /// Output format.
    #[arg(long, short, default_value = "yaml")]
    format: String,
  },
}

/// Configures the logging system based on the verbosity level.
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Resolves one citation and prints it on stdout.
async fn get(reference: &str, format: &str) -> Result<()> {
  let format = OutputFormat::from_str(format)?;
  let bibliography = IetfBibliography::with_defaults();
  match bibliography.get(reference).await? {
    Some(item) => {
      println!("{}", format.render(&item)?);
      Ok(())
    },
    None => Err(IetfBibdError::NotFound(reference.to_string())),
  }
}

/// Runs a batch export.
async fn fetch(source: &str, output: PathBuf, format: &str) -> Result<()> {
  let source = DataSource::from_str(source)?;
  let format = OutputFormat::from_str(format)?;
  DataFetcher::new(source, output, format).fetch().await?;
  Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let result = match cli.command {
    Commands::Get { reference, format } => get(&reference, &format).await,
    Commands::Fetch { source, output, format } => fetch(&source, output, &format).await,
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err}");
      ExitCode::FAILURE
    },
  }
}
