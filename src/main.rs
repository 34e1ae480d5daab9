//! # Workflow Sync CLI
//!
//! This is the binary entry point for the `workflow-sync` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the run for the selected mode.
//! - Handling top-level application errors and turning them into a non-zero
//!   exit status.
//!
//! The core application logic is defined in the `lib.rs` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
