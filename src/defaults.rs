//! Default values for workflow-sync runs.
//!
//! This module provides centralized default values used by the settings and
//! the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Branch pushed to every updated repository.
pub const BRANCH: &str = "update-ci";

/// Commit message and pull request title.
pub const TITLE: &str = "DEV: Update CI workflows";

/// Pull request body.
pub const PR_BODY: &str = "Updates CI from discourse/.github";

/// Branch pull requests are opened against.
pub const BASE_BRANCH: &str = "main";

/// Organisation owning every target repository.
pub const OWNER: &str = "discourse";

pub const GIT_HOST: &str = "https://github.com";

pub const API_URL: &str = "https://api.github.com";

/// Directory inside each workspace that receives the templates.
pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// Workflow files superseded by the current templates.
pub const DEPRECATED_WORKFLOWS: [&str; 4] = [
    ".github/workflows/plugin-linting.yml",
    ".github/workflows/plugin-tests.yml",
    ".github/workflows/component-linting.yml",
    ".github/workflows/component-tests.yml",
];

/// Retries allowed per pull request request while rate limited.
pub const MAX_RETRIES: u32 = 20;

/// Minimum wait after a secondary rate limit, in seconds.
pub const SECONDARY_RETRY_AFTER_SECS: u64 = 5 * 60;

/// Wait used when a primary rate limit carries no usable reset time.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Longest wait honoured from a rate limit response, in seconds. The primary
/// quota window is one hour.
pub const MAX_RETRY_AFTER_SECS: u64 = 60 * 60;

/// Per-request HTTP timeout, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Returns the default root for scratch workspaces.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/workflow-sync/workspaces` (XDG Base Directory)
/// - macOS: `~/Library/Caches/workflow-sync/workspaces`
/// - Windows: `{FOLDERID_LocalAppData}\workflow-sync\workspaces`
///
/// Falls back to `.workflow-sync` in the current directory if the platform
/// cache directory cannot be determined.
///
/// This can be overridden by the `--work-dir` CLI flag or the
/// `WORKFLOW_SYNC_WORK_DIR` environment variable.
pub fn default_work_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("workflow-sync"))
        .unwrap_or_else(|| PathBuf::from(".workflow-sync"))
        .join("workspaces")
}
