//! File watcher for continuous compilation
//!
//! Implements the `watch` command with:
//! - Fixed-window debouncing (5s from the first change)
//! - Full rebuild on global configuration changes
//! - Graceful Ctrl+C shutdown
//! - NDJSON output for scripting

mod event;
mod queue;
mod use_case;

pub use event::{ChangeEvent, ChangeKind, ChangeSubject, WatchEvent, WatchOptions, DEBOUNCE_MS};
pub use queue::{Batches, ChangeQueue, DebounceWindow, SettledBatch, POLL_INTERVAL};
pub use use_case::{classify, Collaborators, Watcher, WatcherPhase};
