use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use jinja_watch::compiler::Delimiters;
use jinja_watch::entities::DEFAULT_ENTITIES_URL;
use jinja_watch::watcher::DEBOUNCE_MS;

/// jinja-watch - recompile *.yaml.jinja templates whenever they change
#[derive(Parser, Debug)]
#[command(name = "jinja-watch")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Run 'jinja-watch' without a command to start watching.")]
pub struct Cli {
    /// NDJSON event output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Compile everything, then recompile on every change (default)
    Watch,

    /// Compile everything once and exit; non-zero if any template failed
    Build,

    /// Check the root, the configuration document and the formatter
    Check,
}

/// Formatter applied to rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatterKind {
    /// Run `prettier` on every rendered file
    Prettier,
    /// Write rendered output unchanged
    #[value(name = "none")]
    Disabled,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory holding templates and jinja-watch.yaml [fallback: $HASS_CONFIG_DIR]
    #[arg(long, global = true, env = "JINJA_WATCH_ROOT")]
    pub root: Option<PathBuf>,

    /// Entity states endpoint
    #[arg(long, global = true, env = "JINJA_WATCH_ENTITIES_URL", default_value = DEFAULT_ENTITIES_URL)]
    pub entities_url: String,

    /// Bearer token for the entity endpoint; without it no entity data is fetched
    #[arg(long, global = true, env = "SUPERVISOR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Debounce window in milliseconds, fixed from the first change
    #[arg(long, global = true, default_value_t = DEBOUNCE_MS)]
    pub debounce_ms: u64,

    /// Parallel compile workers [default: available parallelism]
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Output formatter
    #[arg(long, global = true, value_enum, default_value = "prettier")]
    pub formatter: FormatterKind,

    #[command(flatten)]
    pub delimiters: DelimiterArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DelimiterArgs {
    /// Variable start delimiter
    #[arg(long, global = true, default_value = "{{")]
    pub variable_start: String,

    /// Variable end delimiter
    #[arg(long, global = true, default_value = "}}")]
    pub variable_end: String,

    /// Block start delimiter
    #[arg(long, global = true, default_value = "{%")]
    pub block_start: String,

    /// Block end delimiter
    #[arg(long, global = true, default_value = "%}")]
    pub block_end: String,

    /// Comment start delimiter
    #[arg(long, global = true, default_value = "{#")]
    pub comment_start: String,

    /// Comment end delimiter
    #[arg(long, global = true, default_value = "#}")]
    pub comment_end: String,
}

impl From<DelimiterArgs> for Delimiters {
    fn from(args: DelimiterArgs) -> Self {
        Self {
            variable_start: args.variable_start,
            variable_end: args.variable_end,
            block_start: args.block_start,
            block_end: args.block_end,
            comment_start: args.comment_start,
            comment_end: args.comment_end,
        }
    }
}
