//! Thread-safe holder for the current global configuration.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_yaml_ng::Mapping;

use crate::error::JinjaWatchResult;
use crate::paths::TemplatePath;

use super::types::GlobalConfig;

/// Shared-read store for the global configuration.
///
/// Readers take an `Arc` snapshot and work against it; a reload swaps in a
/// whole new snapshot under the write lock, so a reader sees either the old
/// or the new configuration and never a mix of both.
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<Arc<GlobalConfig>>,
    /// Incremented on every successful reload.
    epoch: AtomicU64,
}

impl ConfigStore {
    /// Create an empty store for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(Arc::new(GlobalConfig::default())),
            epoch: AtomicU64::new(0),
        }
    }

    /// Location of the global configuration document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the document and swap it in.
    ///
    /// On a parse error the previous snapshot stays in force and the error is
    /// returned for reporting.
    pub fn load(&self) -> JinjaWatchResult<Arc<GlobalConfig>> {
        let parsed = Arc::new(GlobalConfig::load(&self.path)?);
        self.swap(parsed.clone());
        Ok(parsed)
    }

    /// Install `config` as the current snapshot, returning the previous one.
    pub fn swap(&self, config: Arc<GlobalConfig>) -> Arc<GlobalConfig> {
        let old = {
            let mut guard = self.current.write();
            std::mem::replace(&mut *guard, config)
        };
        self.epoch.fetch_add(1, Ordering::Release);
        old
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<GlobalConfig> {
        self.current.read().clone()
    }

    /// Merged variables for `path` against the current snapshot
    pub fn resolve(&self, path: &TemplatePath) -> Mapping {
        self.snapshot().resolve(path)
    }

    /// Skip-list check against the current snapshot
    pub fn is_skipped(&self, path: &TemplatePath) -> bool {
        self.current.read().is_skipped(path)
    }

    /// Number of successful reloads so far
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path)
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}
