//! jinja-watch - continuous Jinja-to-YAML compiler
//!
//! Watches a directory tree for `*.yaml.jinja` templates and recompiles each
//! into its sibling `.yaml` whenever the template, the layered global
//! configuration, or the external entity data changes.

pub mod compiler;
pub mod config;
pub mod context;
pub mod discovery;
pub mod entities;
pub mod error;
pub mod paths;
pub mod scheduler;
pub mod watcher;

// Re-exports for convenience
pub use compiler::{CompileOutcome, Compiler, Delimiters, Formatter, Renderer};
pub use config::{deep_merge, ConfigStore, GlobalConfig};
pub use context::WatchContext;
pub use entities::{EntityCache, EntityFetcher, EntitySnapshot, HttpEntityFetcher};
pub use error::{JinjaWatchError, JinjaWatchResult};
pub use paths::TemplatePath;
pub use scheduler::{BatchReport, CompilationScheduler};
pub use watcher::{Collaborators, WatchEvent, WatchOptions, Watcher};
