//! Template compiler
//!
//! For one template, in order, each step gating the next:
//! 1. Skip-list check (removes artifacts of skipped templates)
//! 2. Variable resolution: global config, per-file override, entity data
//! 3. Render with the configured delimiters
//! 4. Format the rendered text
//! 5. Write output with its provenance header, then drop any stale error file
//!
//! Any failure writes the error file and removes the output instead.

mod artifacts;
mod compile;
mod format;
mod render;


pub use artifacts::{atomic_write, provenance_header, remove_if_exists};
pub use compile::{CompileOutcome, Compiler};
pub use format::{Formatter, NoopFormatter, PrettierFormatter};
pub use render::{Delimiters, MiniJinjaRenderer, Renderer};
