//! # Publisher
//!
//! Turns a dirty workspace into a pull request: create the update branch,
//! stage the workflows directory, commit, force-push, then ask the hosting
//! service for a pull request.
//!
//! The local git steps are best effort: a failure is logged with the captured
//! output and the next step still runs. Only the pull request step decides
//! the [`PullRequestOutcome`].

use crate::config::RepositoryTarget;
use crate::defaults::WORKFLOWS_DIR;
use crate::error::{Error, Result};
use crate::git::Git;
use crate::github::{ApiFailure, PullRequestApi, PullRequestRequest};
use crate::rate_limit::{RetryPolicy, Sleeper};
use crate::settings::Settings;
use crate::workspace::Workspace;

/// Result of asking for a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestOutcome {
    Created,
    AlreadyExists,
    /// Any other failure, with a description. Halts the run.
    Failed(String),
}

/// Publishes workspace changes as a pull request.
pub struct Publisher<'a> {
    settings: &'a Settings,
    git: Git<'a>,
    api: &'a dyn PullRequestApi,
    policy: &'a RetryPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Publisher<'a> {
    pub fn new(
        settings: &'a Settings,
        git: Git<'a>,
        api: &'a dyn PullRequestApi,
        policy: &'a RetryPolicy,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            settings,
            git,
            api,
            policy,
            sleeper,
        }
    }

    /// Branch, commit, push and open a pull request for `target`.
    pub fn publish(&self, workspace: &Workspace, target: &RepositoryTarget) -> PullRequestOutcome {
        let dir = workspace.path();
        let branch = self.settings.branch.as_str();

        best_effort("create branch", self.git.checkout_new_branch(dir, branch));
        best_effort("stage workflows", self.git.add(dir, WORKFLOWS_DIR));
        best_effort("commit", self.git.commit(dir, &self.settings.title));
        best_effort("push", self.git.push_force_upstream(dir, branch));

        self.request_pull_request(target)
    }

    /// Ask the hosting service for a pull request from the update branch.
    pub fn request_pull_request(&self, target: &RepositoryTarget) -> PullRequestOutcome {
        let request = PullRequestRequest {
            owner: self.settings.owner.clone(),
            repo: target.name().to_string(),
            title: self.settings.title.clone(),
            head: self.settings.branch.clone(),
            base: self.settings.base_branch.clone(),
            body: self.settings.body.clone(),
        };
        let description = request.describe();

        let result = self
            .policy
            .execute(self.sleeper, &description, || self.api.create_pull_request(&request));

        match result {
            Ok(()) => PullRequestOutcome::Created,
            Err(ApiFailure::AlreadyExists { message }) => {
                log::info!("{}: {}", target.full_name(&self.settings.owner), message);
                PullRequestOutcome::AlreadyExists
            }
            Err(failure) => {
                let error = self.final_error(failure, &description);
                log::error!("{}", error);
                PullRequestOutcome::Failed(error.to_string())
            }
        }
    }

    fn final_error(&self, failure: ApiFailure, description: &str) -> Error {
        match failure {
            ApiFailure::RateLimited { retry_after, .. } => Error::RateLimitExceeded {
                attempts: self.policy.max_attempts(),
                retry_after: retry_after.unwrap_or_default(),
            },
            other => other.into_error(description),
        }
    }
}

fn best_effort(step: &str, result: Result<()>) {
    if let Err(e) = result {
        log::warn!("Could not {}, continuing: {}", step, e);
    }
}
