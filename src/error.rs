//! # Error Handling
//!
//! This module defines the centralized error type for `workflow-sync`. It uses
//! `thiserror` to build a single `Error` enum covering every failure the
//! library can report, with enough context to explain the failure to the
//! person running the tool.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant corresponds to one failure mode
//!   and carries the repository, command or URL involved.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Not every variant is fatal. How the orchestrator reacts to each one is
//! decided in `orchestrator`:
//!
//! - `ConfigParse`, `Template` and `MissingToken` abort before any repository
//!   is processed.
//! - `GitClone` skips the current repository.
//! - `GitCommand` is logged and the pipeline carries on.
//! - `RateLimitExceeded`, `PullRequest` and `Network` raised while creating a
//!   pull request halt the whole run.

use thiserror::Error;

/// Main error type for workflow-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// The repository list could not be read or did not have the expected shape.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// Cloning a target repository failed.
    #[error("Git clone error for {url}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A local git subcommand could not be spawned or exited unsuccessfully.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// The workflow template directory is missing or empty.
    #[error("Template error: {message}")]
    Template { message: String },

    /// The hosting service kept rate limiting a request past the retry ceiling.
    #[error("Rate limit still in effect after {attempts} attempts (last retry-after: {retry_after}s)")]
    RateLimitExceeded { attempts: u32, retry_after: u64 },

    /// The hosting service rejected a pull request creation.
    #[error("Pull request creation failed (HTTP {status}): {message}")]
    PullRequest { status: u16, message: String },

    /// The hosting service could not be reached.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// No access token was supplied for the hosting service.
    #[error("No access token provided: set GITHUB_TOKEN or pass --token")]
    MissingToken,

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
