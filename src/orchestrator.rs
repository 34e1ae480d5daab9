//! # Orchestrator
//!
//! Processes repositories strictly one at a time, in list order:
//!
//! ```text
//! Cloning -> Overlaying -> Diffing -> UpToDate
//!                                  -> Publishing -> Created | AlreadyExists | Failed
//! ```
//!
//! A repository that cannot be cloned or staged is skipped and the run moves
//! on. A `Failed` pull request halts the run: the remaining repositories are
//! left untouched, since that failure usually means something systemic such
//! as revoked credentials. Every workspace is released before the next
//! repository starts, and stale workspaces are swept at the start and end of
//! the run.

use crate::changes;
use crate::command::CommandRunner;
use crate::config::RepositoryTarget;
use crate::git::Git;
use crate::output::{self, OutputConfig};
use crate::publish::{PullRequestOutcome, Publisher};
use crate::settings::Settings;
use crate::templates::TemplateSet;
use crate::workspace::Workspace;

/// How processing one repository ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryStatus {
    /// Clone or staging failed; the run continues.
    Skipped(String),
    UpToDate,
    /// Changes found during a dry run.
    WouldUpdate,
    Created,
    AlreadyExists,
    /// Pull request creation failed; the run stops.
    Failed(String),
}

impl RepositoryStatus {
    pub fn halts_run(&self) -> bool {
        matches!(self, RepositoryStatus::Failed(_))
    }
}

impl From<PullRequestOutcome> for RepositoryStatus {
    fn from(outcome: PullRequestOutcome) -> Self {
        match outcome {
            PullRequestOutcome::Created => RepositoryStatus::Created,
            PullRequestOutcome::AlreadyExists => RepositoryStatus::AlreadyExists,
            PullRequestOutcome::Failed(reason) => RepositoryStatus::Failed(reason),
        }
    }
}

/// Results of a whole run, in processing order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<(RepositoryTarget, RepositoryStatus)>,
    /// Number of repositories in the list.
    pub total: usize,
    /// Whether a failure stopped the run before the list was exhausted.
    pub halted: bool,
}

impl RunSummary {
    pub fn count(&self, predicate: impl Fn(&RepositoryStatus) -> bool) -> usize {
        self.results.iter().filter(|(_, s)| predicate(s)).count()
    }

    pub fn status_of(&self, name: &str) -> Option<&RepositoryStatus> {
        self.results
            .iter()
            .find(|(t, _)| t.name() == name)
            .map(|(_, s)| s)
    }
}

/// Drives the per-repository pipeline over a repository list.
pub struct Orchestrator<'a> {
    settings: &'a Settings,
    templates: &'a TemplateSet,
    runner: &'a dyn CommandRunner,
    publisher: Option<Publisher<'a>>,
    output: Option<OutputConfig>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        settings: &'a Settings,
        templates: &'a TemplateSet,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            settings,
            templates,
            runner,
            publisher: None,
            output: None,
        }
    }

    /// Publish changes through `publisher`. Without one, changed repositories
    /// are only reported.
    pub fn with_publisher(mut self, publisher: Publisher<'a>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Print status lines as repositories finish.
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = Some(output);
        self
    }

    /// Process every target in order, stopping at the first failed pull request.
    pub fn run(&self, targets: &[RepositoryTarget]) -> RunSummary {
        Workspace::sweep_stale(&self.settings.work_root);

        let mut summary = RunSummary {
            total: targets.len(),
            ..RunSummary::default()
        };

        for target in targets {
            let status = self.process(target);
            if let Some(config) = &self.output {
                output::print_status(config, target, &status);
            }

            let halts = status.halts_run();
            summary.results.push((target.clone(), status));
            if halts {
                log::error!(
                    "Stopping after '{}': {} repositories left unprocessed",
                    target,
                    targets.len() - summary.results.len()
                );
                summary.halted = true;
                break;
            }
        }

        Workspace::sweep_stale(&self.settings.work_root);
        summary
    }

    /// Run the pipeline for one repository. The workspace is released before
    /// returning, whatever the outcome.
    pub fn process(&self, target: &RepositoryTarget) -> RepositoryStatus {
        let git = Git::new(self.runner);
        let url = self.settings.clone_url(target);

        let workspace = match Workspace::acquire(&git, &self.settings.work_root, &url) {
            Ok(workspace) => workspace,
            Err(e) => {
                log::error!("Error cloning '{}': {}", target, e);
                return RepositoryStatus::Skipped(e.to_string());
            }
        };

        let status = self.update(&git, &workspace, target);
        workspace.release();
        status
    }

    fn update(
        &self,
        git: &Git<'_>,
        workspace: &Workspace,
        target: &RepositoryTarget,
    ) -> RepositoryStatus {
        if let Err(e) = workspace.overlay(self.templates) {
            log::error!("Failed to copy templates into '{}': {}", target, e);
            return RepositoryStatus::Skipped(e.to_string());
        }

        if let Err(e) = workspace.remove_deprecated(git, &self.settings.deprecated_paths) {
            log::warn!("Could not remove deprecated workflows from '{}': {}", target, e);
        }

        match changes::has_changes(git, workspace) {
            Ok(false) => return RepositoryStatus::UpToDate,
            Ok(true) => {}
            Err(e) => {
                log::error!("Could not determine changes for '{}': {}", target, e);
                return RepositoryStatus::Skipped(e.to_string());
            }
        }

        let publisher = match &self.publisher {
            Some(publisher) if !self.settings.dry_run => publisher,
            _ => return RepositoryStatus::WouldUpdate,
        };

        if let Some(config) = &self.output {
            println!("{}", output::updating_line(config, target));
        }
        publisher.publish(workspace, target).into()
    }
}
