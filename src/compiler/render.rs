//! Template rendering
//!
//! The renderer is a black box to the rest of the pipeline: template text in,
//! rendered text or an error message out.

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Mapping;

use crate::error::{JinjaWatchError, JinjaWatchResult};

/// The six delimiter strings handed to the renderer unmodified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    pub variable_start: String,
    pub variable_end: String,
    pub block_start: String,
    pub block_end: String,
    pub comment_start: String,
    pub comment_end: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            variable_start: "{{".to_string(),
            variable_end: "}}".to_string(),
            block_start: "{%".to_string(),
            block_end: "%}".to_string(),
            comment_start: "{#".to_string(),
            comment_end: "#}".to_string(),
        }
    }
}

impl Delimiters {
    fn syntax(&self) -> JinjaWatchResult<SyntaxConfig> {
        SyntaxConfig::builder()
            .variable_delimiters(self.variable_start.clone(), self.variable_end.clone())
            .block_delimiters(self.block_start.clone(), self.block_end.clone())
            .comment_delimiters(self.comment_start.clone(), self.comment_end.clone())
            .build()
            .map_err(|e| JinjaWatchError::Render(format!("invalid delimiters: {e}")))
    }
}

/// Renders one template with a resolved variable set
pub trait Renderer: Send + Sync {
    /// `name` identifies the template in error messages.
    fn render(
        &self,
        name: &str,
        template: &str,
        variables: &Mapping,
        delimiters: &Delimiters,
    ) -> JinjaWatchResult<String>;
}

/// Jinja renderer backed by `minijinja`.
///
/// Undefined variables are errors rather than empty strings, so a typo in a
/// template surfaces as a diagnostic instead of silently broken YAML.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniJinjaRenderer;

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for MiniJinjaRenderer {
    fn render(
        &self,
        name: &str,
        template: &str,
        variables: &Mapping,
        delimiters: &Delimiters,
    ) -> JinjaWatchResult<String> {
        let mut env = Environment::new();
        env.set_syntax(delimiters.syntax()?);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);

        let compiled = env
            .template_from_named_str(name, template)
            .map_err(render_error)?;
        compiled.render(variables).map_err(render_error)
    }
}

fn render_error(err: minijinja::Error) -> JinjaWatchError {
    // Alternate form appends the template excerpt around the failing line
    JinjaWatchError::Render(format!("{err:#}"))
}
