//! Layered template configuration
//!
//! Variables for a template are resolved in two layers:
//! 1. Top-level keys of the global document (`jinja-watch.yaml`)
//! 2. The template's entry under `fileConfigs`, deep-merged on top
//!
//! `fileConfigs` and `skippedFiles` are reserved and never exposed to templates.

mod merge;
mod store;
mod types;

pub use merge::{deep_merge, merged};
pub use store::ConfigStore;
pub use types::{GlobalConfig, CONFIG_FILE_NAME, FILE_CONFIGS_KEY, SKIPPED_FILES_KEY};
