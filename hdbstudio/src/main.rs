//! HarperDB reporting connector CLI.
//!
//! Sanitizes queries, infers column schemas and projects rows from captured
//! HarperDB operation responses.
//!
//! # Security Guarantees
//! - Auth tokens are never logged or written to output
//! - Endpoint passwords are redacted before logging
//! - Output is validated before it is written

use anyhow::Context;
use clap::Parser;
use hdbstudio::{Cli, Command, commands};
use hdbstudio_core::init_logging;
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    hdbstudio_core::initialize_schema_validator()
        .context("Failed to initialize output validator")?;

    let result = match &cli.command {
        Command::Sanitize(args) => {
            println!("{}", commands::sanitize(args));
            Ok(())
        }
        Command::Schema(args) => commands::schema(args)
            .await
            .with_context(|| format!("Schema inference failed for {}", args.input.display())),
        Command::Data(args) => commands::data(args)
            .await
            .with_context(|| format!("Data projection failed for {}", args.input.display())),
        Command::Request(args) => commands::request(args)
            .and_then(|preview| {
                serde_json::to_string_pretty(&preview).map_err(|e| {
                    hdbstudio_core::HdbStudioError::serialization("Failed to format request", e)
                })
            })
            .map(|rendered| println!("{}", rendered))
            .context("Failed to build request"),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
