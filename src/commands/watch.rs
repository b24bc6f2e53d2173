use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use jinja_watch::watcher::Watcher;

use crate::cli::RunArgs;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::views::watch::render_watch_header;

pub fn cmd_watch(args: &RunArgs, json: bool, verbose: u8) -> Result<()> {
    let ui = UiContext::new(json);
    let options = super::watch_options(args);
    let collaborators = super::collaborators(args, &options)?;

    if !json {
        let details = [
            ("Debounce", format!("{}ms", options.debounce.as_millis())),
            ("Workers", options.jobs.to_string()),
            (
                "Entities",
                if options.entities_token.is_some() {
                    options.entities_url.clone()
                } else {
                    "disabled (no token)".to_string()
                },
            ),
        ];
        print!(
            "{}",
            render_watch_header(
                "jinja-watch",
                Icon::Watch,
                &options.root.display().to_string(),
                &details,
                ui.color,
                ui.unicode
            )
        );
    }

    let mut watcher = Watcher::new(options, collaborators)?;

    // SIGINT, SIGTERM and SIGHUP all take the graceful path
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("failed to install signal handler")?;

    watcher.run(running, |event| super::print_event(&ui, verbose > 0, &event))?;
    Ok(())
}
