//! Change detection for a staged workspace.

use crate::error::Result;
use crate::git::Git;
use crate::workspace::Workspace;

/// Whether `git status --porcelain` output reports any change.
pub fn porcelain_has_changes(status: &str) -> bool {
    status.lines().any(|line| !line.trim().is_empty())
}

/// Whether the workspace differs from the commit it was cloned at.
///
/// Computed fresh on every call. Templates copied over byte-identical files
/// leave the status clean.
pub fn has_changes(git: &Git<'_>, workspace: &Workspace) -> Result<bool> {
    let status = git.status_porcelain(workspace.path())?;
    Ok(porcelain_has_changes(&status))
}
