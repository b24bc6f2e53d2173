//! Global configuration document

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_yaml_ng::{Mapping, Value};

use crate::error::{JinjaWatchError, JinjaWatchResult};
use crate::paths::TemplatePath;

use super::merge::deep_merge;

/// File name of the global configuration document under the root
pub const CONFIG_FILE_NAME: &str = "jinja-watch.yaml";

/// Reserved key holding per-file overrides
pub const FILE_CONFIGS_KEY: &str = "fileConfigs";

/// Reserved key holding the skip list
pub const SKIPPED_FILES_KEY: &str = "skippedFiles";

/// Parsed global configuration.
///
/// Immutable once parsed; a reload produces a new value that replaces this
/// one wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalConfig {
    variables: Mapping,
    file_configs: BTreeMap<String, Mapping>,
    skipped_files: BTreeSet<String>,
}

impl GlobalConfig {
    /// Read and parse the document at `path`.
    ///
    /// A missing document is an empty configuration, not an error.
    pub fn load(path: &Path) -> JinjaWatchResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse document text; `file` is only used for error messages.
    pub fn parse(content: &str, file: &Path) -> JinjaWatchResult<Self> {
        let document: Value = serde_yaml_ng::from_str(content)
            .map_err(|e| JinjaWatchError::config_parse(file, e.to_string()))?;

        let top = match document {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(top) => top,
            other => {
                return Err(JinjaWatchError::config_parse(
                    file,
                    format!("top level must be a mapping, found {}", type_name(&other)),
                ))
            }
        };

        let mut config = Self::default();
        for (key, value) in top {
            if key.as_str() == Some(FILE_CONFIGS_KEY) {
                config.file_configs = parse_file_configs(value, file)?;
            } else if key.as_str() == Some(SKIPPED_FILES_KEY) {
                config.skipped_files = parse_skipped_files(value, file)?;
            } else {
                config.variables.insert(key, value);
            }
        }
        Ok(config)
    }

    /// Template variables, without the reserved keys
    pub fn variables(&self) -> &Mapping {
        &self.variables
    }

    /// Per-file override for `path`, if any
    pub fn file_config(&self, path: &TemplatePath) -> Option<&Mapping> {
        self.file_configs.get(path.as_str())
    }

    /// Exact, case-sensitive skip-list membership
    pub fn is_skipped(&self, path: &TemplatePath) -> bool {
        self.skipped_files.contains(path.as_str())
    }

    /// Variables for `path`: globals with its override deep-merged on top
    pub fn resolve(&self, path: &TemplatePath) -> Mapping {
        let mut variables = self.variables.clone();
        if let Some(overrides) = self.file_config(path) {
            deep_merge(&mut variables, overrides);
        }
        variables
    }

    /// Number of per-file overrides
    pub fn file_config_count(&self) -> usize {
        self.file_configs.len()
    }

    /// Skip list entries, sorted
    pub fn skipped_files(&self) -> impl Iterator<Item = &str> {
        self.skipped_files.iter().map(String::as_str)
    }
}

fn parse_file_configs(value: Value, file: &Path) -> JinjaWatchResult<BTreeMap<String, Mapping>> {
    let entries = match value {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Mapping(entries) => entries,
        other => {
            return Err(JinjaWatchError::config_parse(
                file,
                format!(
                    "'{}' must be a mapping of path to overrides, found {}",
                    FILE_CONFIGS_KEY,
                    type_name(&other)
                ),
            ))
        }
    };

    let mut configs = BTreeMap::new();
    for (path, overrides) in entries {
        let Some(path) = path.as_str().map(str::to_string) else {
            return Err(JinjaWatchError::config_parse(
                file,
                format!("'{}' keys must be file paths", FILE_CONFIGS_KEY),
            ));
        };
        let mut overrides = match overrides {
            Value::Null => Mapping::new(),
            Value::Mapping(m) => m,
            other => {
                return Err(JinjaWatchError::config_parse(
                    file,
                    format!(
                        "'{}.{}' must be a mapping, found {}",
                        FILE_CONFIGS_KEY,
                        path,
                        type_name(&other)
                    ),
                ))
            }
        };
        // Reserved keys only mean something at the top level
        for reserved in [FILE_CONFIGS_KEY, SKIPPED_FILES_KEY] {
            if overrides.remove(reserved).is_some() {
                tracing::warn!(template = %path, key = reserved, "ignoring reserved key in per-file override");
            }
        }
        configs.insert(path, overrides);
    }
    Ok(configs)
}

fn parse_skipped_files(value: Value, file: &Path) -> JinjaWatchResult<BTreeSet<String>> {
    let entries = match value {
        Value::Null => return Ok(BTreeSet::new()),
        Value::Sequence(entries) => entries,
        other => {
            return Err(JinjaWatchError::config_parse(
                file,
                format!(
                    "'{}' must be a list of paths, found {}",
                    SKIPPED_FILES_KEY,
                    type_name(&other)
                ),
            ))
        }
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            Value::String(path) => Ok(path),
            other => Err(JinjaWatchError::config_parse(
                file,
                format!(
                    "'{}' entries must be strings, found {}",
                    SKIPPED_FILES_KEY,
                    type_name(&other)
                ),
            )),
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
