//! jarscan - scan packaged units of compiled artifacts
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Command-line wrapper around `jarscan-core`: hands locator strings and a
//! filter profile to the scanner and prints the matched sets.
//!
//! # Locators
//!
//! ```text
//! target/explodedpar.par                       exploded directory
//! target/defaultpar.par                        archive file
//! https://repo.example.org/lib/app.jar         remote archive, read as a stream
//! jar:file:/srv/app.ear!/lib/defaultpar.par    nested archive
//! /srv/app.war!/WEB-INF/classes                directory inside an archive
//! ```

pub mod cmd;
pub mod profile;
pub mod report;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "jarscan")]
#[command(author, version, about = "jarscan - scan archives and directories for matching members")]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan one or more locators
    Scan {
        /// Directory, archive, URL or nested `outer!inner` locator
        #[arg(required = true)]
        locators: Vec<String>,
        /// Filter profile (TOML); defaults to the built-in persistence profile
        #[arg(long, short = 'p', env = "JARSCAN_PROFILE")]
        profile: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Treat unreachable remote locations as empty
        #[arg(long)]
        best_effort: bool,
        /// Traverse nested archives forward-only instead of materializing them
        #[arg(long)]
        stream_nested: bool,
    },
    /// Show how a locator is parsed, without scanning it
    Resolve {
        /// Locator to parse
        locator: String,
        /// Also check whether the physical location is reachable
        #[arg(long)]
        probe: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
