//! # Output Configuration
//!
//! This module renders the per-repository status lines printed during a run,
//! with emoji when the terminal supports it and bracketed plain-text markers
//! otherwise.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use crate::config::RepositoryTarget;
use crate::orchestrator::{RepositoryStatus, RunSummary};
use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: "always", "never", or "auto".
    /// In auto mode colors are disabled by `NO_COLOR`, `CLICOLOR=0`,
    /// `TERM=dumb`, or a non-TTY stdout (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Always use emoji, regardless of the environment.
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Always use plain-text markers, regardless of the environment.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Line announcing that a repository is about to be published.
pub fn updating_line(config: &OutputConfig, target: &RepositoryTarget) -> String {
    format!("{} Updating '{}'", emoji(config, "🔧", "[UPDATE]"), target)
}

/// Line describing how a repository finished.
pub fn status_line(
    config: &OutputConfig,
    target: &RepositoryTarget,
    status: &RepositoryStatus,
) -> String {
    match status {
        RepositoryStatus::Skipped(reason) => {
            format!(
                "{} Error processing '{}': {}",
                emoji(config, "🔥", "[SKIP]"),
                target,
                reason
            )
        }
        RepositoryStatus::UpToDate => {
            format!("{} '{}' is already up to date", emoji(config, "✅", "[OK]"), target)
        }
        RepositoryStatus::WouldUpdate => {
            format!("{} '{}' would be updated", emoji(config, "📝", "[DRY-RUN]"), target)
        }
        RepositoryStatus::Created => {
            format!("{} PR created for '{}'", emoji(config, "✅", "[OK]"), target)
        }
        RepositoryStatus::AlreadyExists => {
            format!("{} PR already exists for '{}'", emoji(config, "✅", "[OK]"), target)
        }
        RepositoryStatus::Failed(reason) => {
            format!(
                "{} Failed to create PR for '{}': {}",
                emoji(config, "❓", "[FAIL]"),
                target,
                reason
            )
        }
    }
}

/// Print a status line, errors to stderr.
pub fn print_status(config: &OutputConfig, target: &RepositoryTarget, status: &RepositoryStatus) {
    let line = status_line(config, target, status);
    match status {
        RepositoryStatus::Skipped(_) | RepositoryStatus::Failed(_) => eprintln!("{}", line),
        _ => println!("{}", line),
    }
}

/// Closing summary of a run.
pub fn summary_line(config: &OutputConfig, summary: &RunSummary) -> String {
    let updated = summary.count(|s| {
        matches!(
            s,
            RepositoryStatus::Created
                | RepositoryStatus::AlreadyExists
                | RepositoryStatus::WouldUpdate
        )
    });
    let up_to_date = summary.count(|s| matches!(s, RepositoryStatus::UpToDate));
    let skipped = summary.count(|s| matches!(s, RepositoryStatus::Skipped(_)));

    if summary.halted {
        format!(
            "{} Stopped after {} of {} repositories ({} updated, {} up to date, {} skipped)",
            emoji(config, "❌", "[STOPPED]"),
            summary.results.len(),
            summary.total,
            updated,
            up_to_date,
            skipped
        )
    } else {
        format!(
            "{} Processed {} repositories ({} updated, {} up to date, {} skipped)",
            emoji(config, "🏁", "[DONE]"),
            summary.total,
            updated,
            up_to_date,
            skipped
        )
    }
}
