//! # Workflow Sync Library
//!
//! This library keeps the CI workflow files of a family of repositories in
//! step with a central set of templates. It is used by the `workflow-sync`
//! command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use workflow_sync::config::{self, Mode};
//! use std::path::Path;
//!
//! let targets = config::parse("repositories:\n  - forum-plugin-a\n").unwrap();
//! assert_eq!(targets[0].name(), "forum-plugin-a");
//!
//! let mode: Mode = "themes".parse().unwrap();
//! assert_eq!(mode.config_path(Path::new(".")), Path::new("./themes.yml"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`, `settings`, `defaults`)**: The repository
//!   list for a mode and the fixed values of a run (owner, branch, title).
//! - **Templates (`templates`)**: The workflow files copied into every
//!   repository.
//! - **Workspaces (`workspace`, `git`, `command`)**: A fresh shallow clone per
//!   repository in a uniquely named scratch directory.
//! - **Publishing (`publish`, `github`, `rate_limit`)**: Branch, commit,
//!   force-push and open a pull request, waiting out rate limits.
//! - **Orchestration (`orchestrator`, `output`)**: The sequential loop over
//!   the repository list and the status lines it prints.
//!
//! ## Execution Flow
//!
//! For each repository, in list order:
//!
//! 1.  **Clone** the repository into a new workspace.
//! 2.  **Overlay** the templates onto `.github/workflows` and remove
//!     deprecated workflow files.
//! 3.  **Detect** changes with `git status --porcelain`.
//! 4.  **Publish** when something changed: `update-ci` branch, commit,
//!     force-push, pull request.
//!
//! A pull request failure other than "already exists" stops the loop.

pub mod changes;
pub mod command;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod github;
pub mod orchestrator;
pub mod output;
pub mod publish;
pub mod rate_limit;
pub mod settings;
pub mod templates;
pub mod workspace;

#[cfg(test)]
mod fakes;
