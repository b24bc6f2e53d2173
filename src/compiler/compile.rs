//! Single-template compilation

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use crate::context::WatchContext;
use crate::error::JinjaWatchResult;
use crate::paths::TemplatePath;

use super::artifacts::{atomic_write, provenance_header, remove_if_exists};
use super::format::{Formatter, NoopFormatter};
use super::render::{Delimiters, MiniJinjaRenderer, Renderer};

/// Result of compiling one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Output written; any stale error file removed
    Success { output: PathBuf },
    /// Template is on the skip list; its artifacts were removed
    Skipped,
    /// Error file written; any stale output removed
    Failure { reason: String },
    /// Source no longer exists; its artifacts were removed
    Removed,
}

impl CompileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompileOutcome::Success { .. })
    }
}

/// Compiles templates against the shared context.
///
/// Side effects are limited to the template's output file and its error
/// file, so any number of compiles for different paths may run at once.
pub struct Compiler {
    context: Arc<WatchContext>,
    renderer: Box<dyn Renderer>,
    formatter: Box<dyn Formatter>,
    delimiters: Delimiters,
}

impl Compiler {
    /// Compiler with the default renderer and no formatting
    pub fn new(context: Arc<WatchContext>) -> Self {
        Self {
            context,
            renderer: Box::new(MiniJinjaRenderer::new()),
            formatter: Box::new(NoopFormatter),
            delimiters: Delimiters::default(),
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn context(&self) -> &Arc<WatchContext> {
        &self.context
    }

    /// Compile `path`, writing exactly one of its two artifacts.
    pub fn compile(&self, path: &TemplatePath) -> CompileOutcome {
        // One snapshot for both the skip check and variable resolution
        let config = self.context.config().snapshot();
        if config.is_skipped(path) {
            if let Err(e) = self.clear_artifacts(path) {
                tracing::warn!(template = %path, error = %e, "failed to remove artifacts of skipped template");
            }
            return CompileOutcome::Skipped;
        }

        let root = self.context.root();
        let source = match fs::read_to_string(path.source_path(root)) {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if let Err(e) = self.clear_artifacts(path) {
                    tracing::warn!(template = %path, error = %e, "failed to remove artifacts of deleted template");
                }
                return CompileOutcome::Removed;
            }
            Err(e) => return self.fail(path, format!("could not read template: {e}")),
        };

        let variables = self.context.variables_for(&config, path);

        let rendered = match self.renderer.render(
            path.as_str(),
            &source,
            &variables,
            &self.delimiters,
        ) {
            Ok(rendered) => rendered,
            Err(e) => return self.fail(path, e.to_string()),
        };

        let formatted = match self.formatter.format(&rendered) {
            Ok(formatted) => formatted,
            Err(e) => return self.fail(path, e.to_string()),
        };

        let mut content = provenance_header(path.file_name());
        content.push_str(&formatted);

        let output = path.output_path(root);
        if let Err(e) = atomic_write(&output, &content) {
            return self.fail(path, format!("could not write {}: {e}", output.display()));
        }
        if let Err(e) = remove_if_exists(&path.error_path(root)) {
            tracing::warn!(template = %path, error = %e, "failed to remove stale error file");
        }

        tracing::debug!(template = %path, output = %output.display(), "compiled");
        CompileOutcome::Success { output }
    }

    /// Remove both artifacts of `path`; returns whether anything was removed.
    pub fn clear_artifacts(&self, path: &TemplatePath) -> JinjaWatchResult<bool> {
        let root = self.context.root();
        let output = remove_if_exists(&path.output_path(root))?;
        let errors = remove_if_exists(&path.error_path(root))?;
        Ok(output || errors)
    }

    fn fail(&self, path: &TemplatePath, reason: String) -> CompileOutcome {
        let root = self.context.root();
        tracing::debug!(template = %path, %reason, "compile failed");

        if let Err(e) = atomic_write(&path.error_path(root), &format!("{reason}\n")) {
            tracing::warn!(template = %path, error = %e, "failed to write error file");
        }
        // A broken template must not leave a stale output behind
        if let Err(e) = remove_if_exists(&path.output_path(root)) {
            tracing::warn!(template = %path, error = %e, "failed to remove stale output");
        }

        CompileOutcome::Failure { reason }
    }
}
