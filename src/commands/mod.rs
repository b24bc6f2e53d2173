//! Command handlers
//!
//! Each handler turns parsed arguments into library calls and renders the
//! resulting events.

mod build;
mod check;
mod watch;

pub use build::cmd_build;
pub use check::cmd_check;
pub use watch::cmd_watch;

use std::path::PathBuf;
use std::time::Duration;

use jinja_watch::compiler::{Formatter, NoopFormatter, PrettierFormatter};
use jinja_watch::watcher::{Collaborators, WatchEvent, WatchOptions};
use jinja_watch::JinjaWatchResult;

use crate::cli::{FormatterKind, RunArgs};
use crate::ui::context::UiContext;
use crate::ui::views::watch::render_watch_event;

/// `--root`, then `$HASS_CONFIG_DIR`, then the working directory
pub fn resolve_root(args: &RunArgs) -> PathBuf {
    resolve_root_with(args.root.clone(), std::env::var_os("HASS_CONFIG_DIR").map(PathBuf::from))
}

fn resolve_root_with(flag: Option<PathBuf>, hass_config_dir: Option<PathBuf>) -> PathBuf {
    flag.or(hass_config_dir).unwrap_or_else(|| PathBuf::from("."))
}

pub fn watch_options(args: &RunArgs) -> WatchOptions {
    let mut options = WatchOptions::new(resolve_root(args))
        .with_debounce(Duration::from_millis(args.debounce_ms))
        .with_delimiters(args.delimiters.clone().into())
        .with_entities(args.entities_url.clone(), args.token.clone());
    if let Some(jobs) = args.jobs {
        options = options.with_jobs(jobs);
    }
    options
}

/// Build the formatter, failing early when its program is missing.
pub fn formatter(kind: FormatterKind) -> JinjaWatchResult<Box<dyn Formatter>> {
    match kind {
        FormatterKind::Prettier => {
            let program = PrettierFormatter::default().ensure_installed()?;
            Ok(Box::new(PrettierFormatter::new(program)))
        }
        FormatterKind::Disabled => Ok(Box::new(NoopFormatter)),
    }
}

pub fn collaborators(args: &RunArgs, options: &WatchOptions) -> JinjaWatchResult<Collaborators> {
    Ok(Collaborators::from_options(options).with_formatter(formatter(args.formatter)?))
}

/// Print one event as NDJSON or as a human line.
pub fn print_event(ui: &UiContext, verbose: bool, event: &WatchEvent) {
    if ui.json {
        println!("{}", event.to_json());
        return;
    }

    let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
    let Some(rendered) = render_watch_event(&timestamp, event, verbose, ui.color, ui.unicode)
    else {
        return;
    };
    match event {
        WatchEvent::Error { .. } | WatchEvent::CompileFailed { .. } => eprint!("{rendered}"),
        _ => print!("{rendered}"),
    }
}
