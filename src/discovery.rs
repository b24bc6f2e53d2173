//! Template discovery
//!
//! Walks the root directory for `*.yaml.jinja` files. Hidden directories and
//! `.gitignore` rules are not honoured: every template under the root counts.

use std::path::Path;

use ignore::WalkBuilder;

use crate::config::GlobalConfig;
use crate::error::{JinjaWatchError, JinjaWatchResult};
use crate::paths::{has_template_suffix, TemplatePath};

/// Every template under `root`, sorted, skipped ones included.
pub fn walk(root: &Path) -> JinjaWatchResult<Vec<TemplatePath>> {
    if !root.is_dir() {
        return Err(JinjaWatchError::RootNotFound {
            path: root.to_path_buf(),
        });
    }
    // Surface an unreadable root as a hard error instead of an empty walk
    std::fs::read_dir(root)?;
    Ok(walk_under(root, root))
}

/// Templates inside `dir`, named relative to `root`.
///
/// Used when a whole directory appears at once; unreadable entries are
/// logged and skipped.
pub fn walk_under(root: &Path, dir: &Path) -> Vec<TemplatePath> {
    let mut templates = Vec::new();
    for entry in WalkBuilder::new(dir).standard_filters(false).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry during discovery");
                continue;
            }
        };

        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if !has_template_suffix(entry.path()) {
            continue;
        }
        if let Some(template) = TemplatePath::from_absolute(root, entry.path()) {
            templates.push(template);
        }
    }

    templates.sort();
    templates
}

/// Templates under `root` that are not on the skip list.
pub fn scan(root: &Path, config: &GlobalConfig) -> JinjaWatchResult<Vec<TemplatePath>> {
    let mut templates = walk(root)?;
    templates.retain(|t| !config.is_skipped(t));
    tracing::debug!(count = templates.len(), root = %root.display(), "discovered templates");
    Ok(templates)
}
