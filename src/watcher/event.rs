//! Watch event types and options

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::compiler::Delimiters;
use crate::entities::DEFAULT_ENTITIES_URL;
use crate::paths::TemplatePath;

/// Debounce window duration in milliseconds
pub const DEBOUNCE_MS: u64 = 5_000;

/// What happened to a watched path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

/// What a change refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSubject {
    /// A template source file
    Template(TemplatePath),
    /// The global configuration document
    GlobalConfig,
}

/// One file-system change, as classified from a raw notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub subject: ChangeSubject,
    pub kind: ChangeKind,
    pub at: Instant,
}

impl ChangeEvent {
    pub fn template(path: TemplatePath, kind: ChangeKind) -> Self {
        Self::template_at(path, kind, Instant::now())
    }

    pub fn template_at(path: TemplatePath, kind: ChangeKind, at: Instant) -> Self {
        Self {
            subject: ChangeSubject::Template(path),
            kind,
            at,
        }
    }

    pub fn global_config(kind: ChangeKind) -> Self {
        Self {
            subject: ChangeSubject::GlobalConfig,
            kind,
            at: Instant::now(),
        }
    }
}

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Directory containing templates and the global config document
    pub root: PathBuf,
    /// Debounce window length
    pub debounce: Duration,
    /// Worker pool size
    pub jobs: usize,
    /// Delimiters passed to the renderer
    pub delimiters: Delimiters,
    /// Entity states endpoint
    pub entities_url: String,
    /// Bearer token for the entity endpoint; no token means no entity data
    pub entities_token: Option<String>,
}

impl WatchOptions {
    /// Create new watch options with minimal required fields
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            debounce: Duration::from_millis(DEBOUNCE_MS),
            jobs: crate::scheduler::default_jobs(),
            delimiters: Delimiters::default(),
            entities_url: DEFAULT_ENTITIES_URL.to_string(),
            entities_token: None,
        }
    }

    /// Set the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the worker count
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set renderer delimiters
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Set the entity endpoint and token
    pub fn with_entities(mut self, url: impl Into<String>, token: Option<String>) -> Self {
        self.entities_url = url.into();
        self.entities_token = token;
        self
    }
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    /// Initial build finished and the watcher is subscribed
    WatchStarted { root: String, templates: usize },
    /// Global configuration loaded
    ConfigReloaded {
        variables: usize,
        file_configs: usize,
        skipped_files: usize,
    },
    /// Global configuration rejected; previous one kept
    ConfigRejected { message: String },
    /// Entity snapshot refreshed
    EntitiesRefreshed { count: usize },
    /// Entity data unavailable; previous snapshot kept
    EntitiesUnavailable { reason: String },
    /// Template queued for compilation
    FileChanged { path: String },
    /// Template deleted or skipped; its artifacts were removed
    FileRemoved { path: String },
    /// Batch handed to the workers
    BatchStarted { size: usize },
    /// Template compiled
    Compiled { path: String, output: String },
    /// Template on the skip list
    Skipped { path: String },
    /// Template failed; error file written
    CompileFailed { path: String, message: String },
    /// Batch finished
    BatchComplete {
        compiled: usize,
        skipped: usize,
        failed: usize,
        removed: usize,
    },
    /// Non-fatal error
    Error { message: String },
    /// Watch stopped
    Shutdown,
}

impl WatchEvent {
    /// Convert to JSON string with "command": "watch" field included
    pub fn to_json(&self) -> String {
        let mut value =
            serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"event": "error"}));
        if let Some(obj) = value.as_object_mut() {
            obj.insert("command".to_string(), serde_json::json!("watch"));
        }
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }
}
