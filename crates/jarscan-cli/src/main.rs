//! jarscan - scan packaged units of compiled artifacts

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jarscan_cli::cmd;
use jarscan_cli::cmd::scan::ScanOptions;
use jarscan_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan {
            locators,
            profile,
            json,
            best_effort,
            stream_nested,
        } => {
            let options = ScanOptions {
                json,
                best_effort,
                stream_nested,
            };
            cmd::scan::scan(&locators, profile.as_deref(), &options).await
        }
        Commands::Resolve {
            locator,
            probe,
            json,
        } => cmd::resolve::resolve(&locator, probe, json),
    }
}
