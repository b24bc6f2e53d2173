//! Template identity and artifact locations
//!
//! A template is identified by its path relative to the watch root, with `/`
//! separators on every platform. That string is what `fileConfigs` and
//! `skippedFiles` are matched against: exact and case-sensitive, no globbing.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Suffix that marks a file as a template
pub const TEMPLATE_SUFFIX: &str = ".yaml.jinja";

/// Suffix stripped from a template to get its output path
const JINJA_EXTENSION: &str = ".jinja";

/// Suffix appended to the template file name for its diagnostic file
pub const ERROR_LOG_SUFFIX: &str = ".errors.log";

/// A discovered template, relative to the watch root
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplatePath {
    relative: String,
}

impl TemplatePath {
    /// Create from an already-relative, `/`-separated path.
    pub fn new(relative: impl Into<String>) -> Self {
        Self {
            relative: relative.into(),
        }
    }

    /// Identify `path` as a template below `root`.
    ///
    /// Returns `None` when the path is outside the root, does not carry the
    /// template suffix, or contains components that cannot be expressed
    /// relative to the root.
    pub fn from_absolute(root: &Path, path: &Path) -> Option<Self> {
        if !has_template_suffix(path) {
            return None;
        }
        let relative = path.strip_prefix(root).ok()?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(Self::new(parts.join("/")))
    }

    /// Relative path string used for configuration lookups
    pub fn as_str(&self) -> &str {
        &self.relative
    }

    /// File name of the template itself
    pub fn file_name(&self) -> &str {
        self.relative
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.relative)
    }

    /// Absolute location of the template source
    pub fn source_path(&self, root: &Path) -> PathBuf {
        self.relative
            .split('/')
            .fold(root.to_path_buf(), |acc, part| acc.join(part))
    }

    /// Generated output: the source with its `.jinja` suffix removed
    pub fn output_path(&self, root: &Path) -> PathBuf {
        let source = self.source_path(root);
        let name = self.file_name();
        let stem = name.strip_suffix(JINJA_EXTENSION).unwrap_or(name);
        source.with_file_name(stem)
    }

    /// Diagnostic file written beside the source on failure
    pub fn error_path(&self, root: &Path) -> PathBuf {
        let source = self.source_path(root);
        source.with_file_name(format!("{}{}", self.file_name(), ERROR_LOG_SUFFIX))
    }
}

impl fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relative)
    }
}

/// Whether the file name ends with the template suffix
pub fn has_template_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.len() > TEMPLATE_SUFFIX.len() && n.ends_with(TEMPLATE_SUFFIX))
        .unwrap_or(false)
}
