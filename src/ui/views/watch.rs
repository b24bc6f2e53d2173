use crate::ui::blocks::header::CommandHeader;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use jinja_watch::watcher::WatchEvent;

pub fn render_watch_header(
    title: &str,
    icon: Icon,
    root: &str,
    details: &[(&str, String)],
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(icon, title);
    header.add("Root", root);
    for (label, value) in details {
        header.add(*label, value.as_str());
    }
    header.render(supports_color, supports_unicode)
}

/// One human-readable line per event; `None` for events only shown verbosely
pub fn render_watch_event(
    timestamp: &str,
    event: &WatchEvent,
    verbose: bool,
    supports_color: bool,
    supports_unicode: bool,
) -> Option<String> {
    let prefix = ColoredText::dim(format!("[{}]", timestamp)).render(supports_color);
    let icon = |icon: Icon| icon.colored(supports_color, supports_unicode);

    let line = match event {
        WatchEvent::WatchStarted { root, templates } => format!(
            "{} {} Watching {} ({} templates). Press Ctrl+C to stop.",
            prefix,
            icon(Icon::Watch),
            root,
            templates
        ),
        WatchEvent::ConfigReloaded {
            variables,
            file_configs,
            skipped_files,
        } => format!(
            "{} {} Config: {} variables, {} file overrides, {} skipped",
            prefix,
            icon(Icon::Progress),
            variables,
            file_configs,
            skipped_files
        ),
        WatchEvent::ConfigRejected { message } => format!(
            "{} {} Config rejected, keeping previous: {}",
            prefix,
            icon(Icon::Warning),
            message
        ),
        WatchEvent::EntitiesRefreshed { count } => {
            format!("{} {} Entities: {}", prefix, icon(Icon::Progress), count)
        }
        WatchEvent::EntitiesUnavailable { reason } => format!(
            "{} {} Entities unavailable: {}",
            prefix,
            icon(Icon::Warning),
            reason
        ),
        WatchEvent::FileChanged { path } => {
            format!("{} {} Changed: {}", prefix, icon(Icon::Arrow), path)
        }
        WatchEvent::FileRemoved { path } => {
            format!("{} {} Removed: {}", prefix, icon(Icon::Trash), path)
        }
        WatchEvent::BatchStarted { .. } | WatchEvent::Skipped { .. } if !verbose => return None,
        WatchEvent::Compiled { .. } if !verbose => return None,
        WatchEvent::BatchStarted { size } => {
            format!("{} {} Compiling {} templates...", prefix, icon(Icon::Progress), size)
        }
        WatchEvent::Skipped { path } => {
            format!("{} {} Skipped: {}", prefix, icon(Icon::Skipped), path)
        }
        WatchEvent::Compiled { path, output } => format!(
            "{} {} {} -> {}",
            prefix,
            icon(Icon::Success),
            path,
            output
        ),
        WatchEvent::CompileFailed { path, message } => format!(
            "{} {} {}: {}",
            prefix,
            icon(Icon::Error),
            path,
            message
        ),
        WatchEvent::BatchComplete {
            compiled,
            skipped,
            failed,
            removed,
        } => {
            let status = if *failed > 0 {
                Icon::Warning
            } else {
                Icon::Success
            };
            let mut summary = format!(
                "{}, {} skipped",
                ColoredText::success(format!("{} compiled", compiled)).render(supports_color),
                skipped
            );
            if *removed > 0 {
                summary.push_str(&format!(", {} removed", removed));
            }
            if *failed > 0 {
                summary.push_str(&format!(
                    ", {}",
                    ColoredText::error(format!("{} failed", failed))
                        .bold()
                        .render(supports_color)
                ));
            }
            format!("{} {} Batch: {}", prefix, icon(status), summary)
        }
        WatchEvent::Error { message } => {
            format!("{} {} Error: {}", prefix, icon(Icon::Error), message)
        }
        WatchEvent::Shutdown => format!("\n{} {} Watch stopped.", prefix, icon(Icon::Watch)),
    };
    Some(format!("{line}\n"))
}
