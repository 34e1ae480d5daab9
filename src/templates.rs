//! Workflow template discovery.
//!
//! A template set is the list of `*.yml` files found directly inside the
//! mode's template directory. It is resolved once at startup and copied into
//! every workspace unchanged.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// A single template file and the name it takes in the workflows directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub file_name: String,
    pub source: PathBuf,
}

/// Ordered collection of workflow templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    /// Discover every `*.yml` file directly inside `dir`, sorted by file name.
    ///
    /// Fails if the directory does not exist or holds no templates, since a run
    /// without templates could only ever report every repository as up to date.
    pub fn discover(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Template {
                message: format!("Template directory not found: {}", dir.display()),
            });
        }

        let pattern = dir.join("*.yml");
        let mut templates = Vec::new();
        for entry in glob::glob(&pattern.to_string_lossy())? {
            let source = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping unreadable template: {}", e);
                    continue;
                }
            };
            if !source.is_file() {
                continue;
            }
            let Some(file_name) = source.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            templates.push(Template { file_name, source });
        }

        if templates.is_empty() {
            return Err(Error::Template {
                message: format!("No *.yml templates found in {}", dir.display()),
            });
        }

        templates.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        log::debug!(
            "Resolved {} template(s) from {}",
            templates.len(),
            dir.display()
        );
        Ok(Self { templates })
    }

    /// Build a set from explicit entries, keeping their order.
    pub fn from_templates(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
