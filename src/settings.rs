//! Runtime settings shared by every stage of a run.

use crate::config::RepositoryTarget;
use crate::defaults;
use std::path::PathBuf;

/// Everything a run needs besides the repository list and templates.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Organisation owning the target repositories.
    pub owner: String,
    /// Base URL repositories are cloned from (`<git_host>/<owner>/<name>`).
    pub git_host: String,
    /// GitHub REST API base URL.
    pub api_url: String,
    /// Branch created in each updated repository.
    pub branch: String,
    /// Branch pull requests target.
    pub base_branch: String,
    /// Commit message and pull request title.
    pub title: String,
    /// Pull request body.
    pub body: String,
    /// Paths removed from each workspace before diffing.
    pub deprecated_paths: Vec<String>,
    /// Parent directory for scratch workspaces.
    pub work_root: PathBuf,
    /// Stop after change detection instead of publishing.
    pub dry_run: bool,
}

impl Settings {
    /// Remote URL for a target repository.
    pub fn clone_url(&self, target: &RepositoryTarget) -> String {
        format!(
            "{}/{}",
            self.git_host.trim_end_matches('/'),
            target.full_name(&self.owner)
        )
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            owner: defaults::OWNER.to_string(),
            git_host: defaults::GIT_HOST.to_string(),
            api_url: defaults::API_URL.to_string(),
            branch: defaults::BRANCH.to_string(),
            base_branch: defaults::BASE_BRANCH.to_string(),
            title: defaults::TITLE.to_string(),
            body: defaults::PR_BODY.to_string(),
            deprecated_paths: defaults::DEPRECATED_WORKFLOWS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            work_root: defaults::default_work_root(),
            dry_run: false,
        }
    }
}
