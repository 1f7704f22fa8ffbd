//! # gps-speed CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Settings resolution (defaults, settings file, environment, flags)
//! - Pipeline orchestration
//! - End-of-run summary

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::Cli;
use commands::run_pipeline;

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "gps-speed starting");

    let result = run_pipeline(&cli);

    if let Err(ref e) = result {
        let chain = format!("{:#}", e);
        tracing::error!(error = %chain, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let config =
        ObservabilityConfig::from_verbosity(cli.verbose, cli.quiet, cli.log_format.into());
    observability::init_with_config(config)
}
