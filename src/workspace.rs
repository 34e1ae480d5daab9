//! # Workspace Stager
//!
//! A [`Workspace`] is the ephemeral checkout of one target repository. Each one
//! lives in its own uniquely-named directory under the work root and is
//! deleted when the handle is released or dropped, so a repository can never
//! see residue from the previous one.
//!
//! [`Workspace::sweep_stale`] removes directories left behind by an earlier
//! process that was killed before it could clean up.

use crate::defaults::WORKFLOWS_DIR;
use crate::error::Result;
use crate::git::Git;
use crate::templates::TemplateSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of every workspace directory created under the work root.
pub const WORKSPACE_PREFIX: &str = "workflow-sync-";

/// Exclusive handle on one repository checkout.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Shallow-clone `url` into a fresh directory under `work_root`.
    ///
    /// On failure the directory is removed before the error is returned.
    pub fn acquire(git: &Git<'_>, work_root: &Path, url: &str) -> Result<Self> {
        fs::create_dir_all(work_root)?;
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(work_root)?;
        log::debug!("Acquired workspace {}", dir.path().display());

        git.clone_shallow(url, dir.path())?;
        Ok(Self { dir })
    }

    /// Root of the checkout.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory the templates are copied into.
    pub fn workflows_dir(&self) -> PathBuf {
        self.path().join(WORKFLOWS_DIR)
    }

    /// Copy every template into the workflows directory, replacing
    /// same-named files.
    pub fn overlay(&self, templates: &TemplateSet) -> Result<()> {
        let workflows_dir = self.workflows_dir();
        fs::create_dir_all(&workflows_dir)?;

        for template in templates.iter() {
            let destination = workflows_dir.join(&template.file_name);
            fs::copy(&template.source, &destination)?;
            log::debug!(
                "Copied {} -> {}",
                template.source.display(),
                destination.display()
            );
        }
        Ok(())
    }

    /// Remove `paths` (relative to the checkout) from the index and the working
    /// tree. Paths that do not exist are ignored.
    pub fn remove_deprecated(&self, git: &Git<'_>, paths: &[String]) -> Result<()> {
        let paths: Vec<&str> = paths.iter().map(String::as_str).collect();
        git.rm_ignore_unmatch(self.path(), &paths)
    }

    /// Delete the checkout.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => log::debug!("Released workspace {}", path.display()),
            Err(e) => log::warn!("Failed to remove workspace {}: {}", path.display(), e),
        }
    }

    /// Remove workspace directories left under `work_root` by earlier runs.
    ///
    /// Returns the number of directories removed. A missing work root is not
    /// an error.
    pub fn sweep_stale(work_root: &Path) -> usize {
        let entries = match fs::read_dir(work_root) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_workspace = entry
                .file_name()
                .to_string_lossy()
                .starts_with(WORKSPACE_PREFIX);
            if !is_workspace || !path.is_dir() {
                continue;
            }
            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    log::info!("Removed stale workspace {}", path.display());
                    removed += 1;
                }
                Err(e) => log::warn!("Failed to remove stale workspace {}: {}", path.display(), e),
            }
        }
        removed
    }
}
