//! Output formatting

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{JinjaWatchError, JinjaWatchResult};

/// Beautifies rendered output before it is written
pub trait Formatter: Send + Sync {
    fn format(&self, text: &str) -> JinjaWatchResult<String>;
}

/// Leaves output untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, text: &str) -> JinjaWatchResult<String> {
        Ok(text.to_string())
    }
}

/// Formats YAML by running `prettier --write` on a temporary copy
#[derive(Debug, Clone)]
pub struct PrettierFormatter {
    program: PathBuf,
}

impl Default for PrettierFormatter {
    fn default() -> Self {
        Self::new("prettier")
    }
}

impl PrettierFormatter {
    pub const INSTALL_HINT: &'static str = "npm install -g prettier";

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Fail early when the program is not on `PATH`.
    pub fn ensure_installed(&self) -> JinjaWatchResult<PathBuf> {
        which::which(&self.program).map_err(|_| JinjaWatchError::DependencyMissing {
            program: self.program.display().to_string(),
            hint: Self::INSTALL_HINT.to_string(),
        })
    }
}

impl Formatter for PrettierFormatter {
    fn format(&self, text: &str) -> JinjaWatchResult<String> {
        // The .yaml suffix is what selects prettier's YAML parser
        let mut file = tempfile::Builder::new()
            .prefix("jinja-watch-")
            .suffix(".yaml")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        let output = Command::new(&self.program)
            .arg("--write")
            .arg(file.path())
            .args(["--log-level", "warn"])
            .output()
            .map_err(|e| {
                JinjaWatchError::Format(format!(
                    "could not run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JinjaWatchError::Format(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(fs::read_to_string(file.path())?)
    }
}
