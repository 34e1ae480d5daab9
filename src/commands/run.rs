//! Run command implementation
//!
//! Loads the repository list and templates for the selected mode, then hands
//! them to the orchestrator:
//! 1. Clone each repository into a scratch workspace
//! 2. Copy the workflow templates over its `.github/workflows`
//! 3. Remove deprecated workflow files
//! 4. If anything changed, commit to `update-ci`, push and open a PR

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use workflow_sync::command::SystemRunner;
use workflow_sync::config::{self, Mode};
use workflow_sync::defaults;
use workflow_sync::error::Error;
use workflow_sync::git::Git;
use workflow_sync::github::GitHubClient;
use workflow_sync::orchestrator::Orchestrator;
use workflow_sync::output::{self, OutputConfig};
use workflow_sync::publish::Publisher;
use workflow_sync::rate_limit::{RetryPolicy, ThreadSleeper};
use workflow_sync::settings::Settings;
use workflow_sync::templates::TemplateSet;

/// Arguments controlling a propagation run
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory holding the repository lists and template directories
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub root: PathBuf,

    /// Repository list file (defaults to <root>/plugins.yml or <root>/themes.yml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Template directory (defaults to the mode's template directory under <root>)
    #[arg(short, long, value_name = "PATH")]
    pub templates: Option<PathBuf>,

    /// Organisation owning the target repositories
    #[arg(long, value_name = "OWNER", default_value = defaults::OWNER)]
    pub owner: String,

    /// Base URL repositories are cloned from
    #[arg(long, value_name = "URL", default_value = defaults::GIT_HOST)]
    pub git_host: String,

    /// GitHub REST API base URL
    #[arg(long, value_name = "URL", default_value = defaults::API_URL)]
    pub api_url: String,

    /// Directory for scratch workspaces
    #[arg(long, value_name = "PATH", env = "WORKFLOW_SYNC_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// GitHub access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Report which repositories would change without pushing or opening PRs
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Keep deprecated workflow files instead of deleting them
    #[arg(long)]
    pub no_cleanup: bool,

    /// Retries per pull request while rate limited
    #[arg(long, value_name = "N", default_value_t = defaults::MAX_RETRIES)]
    pub max_retries: u32,

    /// Minimum wait in seconds after a secondary rate limit
    #[arg(long, value_name = "SECONDS", default_value_t = defaults::SECONDARY_RETRY_AFTER_SECS)]
    pub secondary_delay: u64,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = defaults::REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Suppress per-repository output
    #[arg(short, long)]
    pub quiet: bool,
}

impl RunArgs {
    fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            owner: self.owner.clone(),
            git_host: self.git_host.clone(),
            api_url: self.api_url.clone(),
            deprecated_paths: if self.no_cleanup {
                Vec::new()
            } else {
                defaults.deprecated_paths.clone()
            },
            work_root: self
                .work_dir
                .clone()
                .unwrap_or_else(|| defaults.work_root.clone()),
            dry_run: self.dry_run,
            ..defaults
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            min_secondary_retry_after: Duration::from_secs(self.secondary_delay),
            ..RetryPolicy::default()
        }
    }
}

/// Execute a propagation run for `mode`
pub fn execute(mode: Mode, args: RunArgs, output: OutputConfig) -> Result<()> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| mode.config_path(&args.root));
    let template_dir = args
        .templates
        .clone()
        .unwrap_or_else(|| mode.template_path(&args.root));

    let targets = config::from_file(&config_path)?;
    let templates = TemplateSet::discover(&template_dir)?;
    let settings = args.settings();
    let policy = args.retry_policy();

    log::info!(
        "Propagating {} template(s) from {} to {} {} repositories",
        templates.len(),
        template_dir.display(),
        targets.len(),
        mode
    );

    let runner = SystemRunner::new();
    let sleeper = ThreadSleeper;
    let client;
    let mut orchestrator = Orchestrator::new(&settings, &templates, &runner);
    if !args.quiet {
        orchestrator = orchestrator.with_output(output.clone());
        if settings.dry_run {
            println!(
                "{} DRY RUN MODE - No changes will be pushed",
                output::emoji(&output, "🔎", "[DRY-RUN]")
            );
        }
    }
    if !settings.dry_run {
        let token = args.token.as_deref().ok_or(Error::MissingToken)?;
        client = GitHubClient::new(&settings.api_url, token, Duration::from_secs(args.timeout))?;
        orchestrator = orchestrator.with_publisher(Publisher::new(
            &settings,
            Git::new(&runner),
            &client,
            &policy,
            &sleeper,
        ));
    }

    let summary = orchestrator.run(&targets);

    if !args.quiet {
        println!("{}", output::summary_line(&output, &summary));
    }
    if summary.halted {
        bail!("Run stopped: pull request creation failed");
    }
    Ok(())
}
