//! CLI argument parsing and command dispatch

use anyhow::{bail, Result};
use clap::Parser;

use crate::commands;
use workflow_sync::config::Mode;
use workflow_sync::output::OutputConfig;

/// Workflow Sync - Propagate CI workflow templates to every plugin or theme repository
#[derive(Parser, Debug)]
#[command(name = "workflow-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Which repositories to update: plugins or themes
    #[arg(value_name = "MODE")]
    mode: Option<String>,

    #[command(flatten)]
    run: commands::run::RunArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Validate the mode before touching the filesystem or the network.
        let mode = match self.mode.as_deref().map(str::parse::<Mode>) {
            Some(Ok(mode)) => mode,
            Some(Err(message)) => bail!(message),
            None => bail!("missing mode\n\n{}", Mode::USAGE),
        };

        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        commands::run::execute(mode, self.run, output)
    }
}

/// Route `log` records to stderr. `RUST_LOG`, when set, takes precedence over
/// `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
