use anyhow::{bail, Result};

use jinja_watch::watcher::Watcher;

use crate::cli::RunArgs;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::views::watch::render_watch_header;

/// One full build, no watching. Fails when any template failed to compile.
pub fn cmd_build(args: &RunArgs, json: bool, verbose: u8) -> Result<()> {
    let ui = UiContext::new(json);
    let options = super::watch_options(args);
    let collaborators = super::collaborators(args, &options)?;

    if !json {
        print!(
            "{}",
            render_watch_header(
                "jinja-watch build",
                Icon::Build,
                &options.root.display().to_string(),
                &[("Workers", options.jobs.to_string())],
                ui.color,
                ui.unicode
            )
        );
    }

    let watcher = Watcher::new(options, collaborators)?;
    let report = watcher.build_all(|event| super::print_event(&ui, verbose > 0, &event))?;

    if !report.is_success() {
        bail!("{} template(s) failed to compile", report.failed());
    }
    Ok(())
}
