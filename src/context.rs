//! Shared state read by every compile
//!
//! The context owns the configuration and entity snapshots. Workers only
//! read it; the watcher's reload path is the only writer, and it swaps whole
//! snapshots instead of editing them in place.

use std::path::{Path, PathBuf};

use serde_yaml_ng::{Mapping, Value};

use crate::config::{ConfigStore, GlobalConfig, CONFIG_FILE_NAME};
use crate::entities::EntityCache;
use crate::paths::TemplatePath;

/// Variable name under which entity data is exposed to templates
pub const ENTITIES_VARIABLE: &str = "entities";

/// Root directory plus the snapshots compiled against it
#[derive(Debug)]
pub struct WatchContext {
    root: PathBuf,
    config: ConfigStore,
    entities: EntityCache,
}

impl WatchContext {
    /// Context for `root`, with the global document at its fixed location.
    pub fn new(root: impl Into<PathBuf>, entities: EntityCache) -> Self {
        let root = root.into();
        let config = ConfigStore::new(root.join(CONFIG_FILE_NAME));
        Self {
            root,
            config,
            entities,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn entities(&self) -> &EntityCache {
        &self.entities
    }

    /// Variables for `path` resolved against `config`, with entity data
    /// injected when any is available.
    pub fn variables_for(&self, config: &GlobalConfig, path: &TemplatePath) -> Mapping {
        let mut variables = config.resolve(path);

        let entities = self.entities.get();
        if !entities.is_empty() {
            match serde_yaml_ng::to_value(&*entities) {
                Ok(value) => {
                    variables.insert(Value::from(ENTITIES_VARIABLE), value);
                }
                Err(e) => tracing::warn!(error = %e, "could not expose entity data"),
            }
        }
        variables
    }
}
