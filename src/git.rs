use std::path::Path;

use crate::command::{CommandOutput, CommandRunner};
use crate::error::{Error, Result};

/// Thin typed wrapper over the `git` executable.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Shallow-clone `url` into `target_dir`, which must be missing or empty.
    pub fn clone_shallow(&self, url: &str, target_dir: &Path) -> Result<()> {
        let target = target_dir.to_string_lossy();
        let args = ["clone", url, "-q", "--depth", "1", target.as_ref()];
        log::info!("> git {}", args.join(" "));

        let output = self
            .runner
            .run("git", &args, None)
            .map_err(|e| Error::GitClone {
                url: url.to_string(),
                message: e.to_string(),
                hint: Some("Make sure git is installed and on PATH".to_string()),
            })?;

        if !output.is_success() {
            let stderr = output.stderr.trim().to_string();
            return Err(Error::GitClone {
                url: url.to_string(),
                hint: clone_hint(&stderr),
                message: stderr,
            });
        }

        Ok(())
    }

    /// Run a git subcommand inside `dir`, failing on a non-zero exit.
    pub fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput> {
        log::info!("> git {}", args.join(" "));
        let output = self.runner.run("git", args, Some(dir))?;

        if !output.is_success() {
            let stderr = if output.stderr.trim().is_empty() {
                output.stdout.trim().to_string()
            } else {
                output.stderr.trim().to_string()
            };
            return Err(Error::GitCommand {
                command: format!("git {}", args.join(" ")),
                dir: dir.display().to_string(),
                stderr,
            });
        }

        Ok(output)
    }

    /// Machine-readable working tree status.
    pub fn status_porcelain(&self, dir: &Path) -> Result<String> {
        Ok(self.run(dir, &["status", "--porcelain"])?.stdout)
    }

    pub fn checkout_new_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.run(dir, &["checkout", "-b", branch]).map(|_| ())
    }

    pub fn add(&self, dir: &Path, pathspec: &str) -> Result<()> {
        self.run(dir, &["add", pathspec]).map(|_| ())
    }

    pub fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.run(dir, &["commit", "-m", message]).map(|_| ())
    }

    /// Force-push `branch` to `origin` and record it as the upstream.
    pub fn push_force_upstream(&self, dir: &Path, branch: &str) -> Result<()> {
        self.run(dir, &["push", "-f", "--set-upstream", "origin", branch])
            .map(|_| ())
    }

    /// Remove tracked paths, ignoring the ones that do not exist.
    pub fn rm_ignore_unmatch(&self, dir: &Path, paths: &[&str]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["rm", "-q", "--ignore-unmatch"];
        args.extend_from_slice(paths);
        self.run(dir, &args).map(|_| ())
    }
}

/// Suggest a fix for common clone failures.
fn clone_hint(stderr: &str) -> Option<String> {
    if stderr.contains("Repository not found")
        || stderr.contains("does not exist")
        || stderr.contains("not found")
    {
        Some("Check that the repository exists under the configured owner".to_string())
    } else if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        Some(
            "Authentication failed. For private repos, ensure an SSH key, \
             credential helper or personal access token is configured"
                .to_string(),
        )
    } else {
        None
    }
}
