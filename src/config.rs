//! # Repository List and Mode Selection
//!
//! This module defines the repository list file that drives a run and the
//! [`Mode`] that selects which list and which template directory are used.
//!
//! ## File Format
//!
//! The repository list is a YAML document with a single top-level key:
//!
//! ```yaml
//! repositories:
//!   - forum-plugin-a
//!   - forum-plugin-b
//! ```
//!
//! Entries are short repository names. They are combined with the owner from
//! [`Settings`](crate::settings::Settings) to form the remote URL and the
//! pull request target, and are processed in the order they are listed.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Pattern accepted for repository short names.
const REPOSITORY_NAME_PATTERN: &str = r"^[A-Za-z0-9_.-]+$";

/// One repository to propagate workflows to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
    name: String,
}

impl RepositoryTarget {
    /// Create a target from a repository short name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The repository short name, e.g. `forum-plugin-a`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owner-qualified name, e.g. `discourse/forum-plugin-a`.
    pub fn full_name(&self, owner: &str) -> String {
        format!("{}/{}", owner, self.name)
    }
}

impl fmt::Display for RepositoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Raw shape of the repository list file.
#[derive(Debug, Deserialize)]
struct RepositoryList {
    repositories: Vec<String>,
}

/// Parse a repository list document.
///
/// Fails with [`Error::ConfigParse`] when the document is not valid YAML, has
/// no `repositories` sequence, or contains a name that cannot be a
/// repository.
pub fn parse(content: &str) -> Result<Vec<RepositoryTarget>> {
    let list: RepositoryList = serde_yaml::from_str(content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("Expected a top-level 'repositories:' list of repository names".to_string()),
    })?;

    let valid_name = Regex::new(REPOSITORY_NAME_PATTERN)?;
    list.repositories
        .into_iter()
        .map(|name| {
            let trimmed = name.trim();
            // "." and ".." would resolve to the owner or its parent in URLs.
            let only_dots = trimmed.chars().all(|c| c == '.');
            if !valid_name.is_match(trimmed) || only_dots {
                return Err(Error::ConfigParse {
                    message: format!("Invalid repository name: '{}'", name),
                    hint: Some(
                        "Use the short repository name without the owner, e.g. 'discourse-chat-integration'"
                            .to_string(),
                    ),
                });
            }
            Ok(RepositoryTarget::new(trimmed))
        })
        .collect()
}

/// Read and parse a repository list file.
pub fn from_file(path: &Path) -> Result<Vec<RepositoryTarget>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("Failed to read {}: {}", path.display(), e),
        hint: None,
    })?;
    parse(&content)
}

/// Category of target repositories a run operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Plugins,
    Themes,
}

impl Mode {
    /// Usage line printed when the mode argument is not recognised.
    pub const USAGE: &'static str = "Usage: workflow-sync [OPTIONS] [plugins|themes]";

    /// Repository list file name for this mode.
    pub fn config_file(&self) -> &'static str {
        match self {
            Mode::Plugins => "plugins.yml",
            Mode::Themes => "themes.yml",
        }
    }

    /// Template directory name for this mode.
    pub fn template_dir(&self) -> &'static str {
        match self {
            Mode::Plugins => "plugin-workflow-templates",
            Mode::Themes => "theme-workflow-templates",
        }
    }

    /// Resolve the repository list path under `root`.
    pub fn config_path(&self, root: &Path) -> PathBuf {
        root.join(self.config_file())
    }

    /// Resolve the template directory under `root`.
    pub fn template_path(&self, root: &Path) -> PathBuf {
        root.join(self.template_dir())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "plugins" => Ok(Mode::Plugins),
            "themes" => Ok(Mode::Themes),
            other => Err(format!("invalid mode '{}'\n\n{}", other, Mode::USAGE)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Plugins => f.write_str("plugins"),
            Mode::Themes => f.write_str("themes"),
        }
    }
}
