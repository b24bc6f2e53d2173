//! Error types for jinja-watch
//!
//! Library code returns [`JinjaWatchResult`]; the binary wraps these in `anyhow`.
//! Only [`JinjaWatchError::RootNotFound`] and [`JinjaWatchError::Watch`] are fatal
//! to a running watcher; everything else is reported per file and recovered.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for jinja-watch operations
pub type JinjaWatchResult<T> = Result<T, JinjaWatchError>;

/// Main error type for jinja-watch operations
#[derive(Error, Debug)]
pub enum JinjaWatchError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Global configuration document could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// Template syntax error, undefined variable, or other renderer failure
    #[error("{0}")]
    Render(String),

    /// Output formatter failure
    #[error("formatter failed: {0}")]
    Format(String),

    /// Root directory missing or unreadable
    #[error("root directory not found: {path}")]
    RootNotFound { path: PathBuf },

    /// File-system subscription failed
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Worker pool could not be created
    #[error("failed to start worker pool: {0}")]
    Scheduler(String),

    /// `run` called on a watcher that has already stopped
    #[error("watcher has already stopped")]
    WatcherStopped,

    /// Required external program is not installed
    #[error("'{program}' must be installed: {hint}")]
    DependencyMissing { program: String, hint: String },
}

impl JinjaWatchError {
    pub(crate) fn config_parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            file: file.into(),
            message: message.into(),
        }
    }
}
