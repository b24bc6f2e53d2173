use anyhow::{bail, Result};

use jinja_watch::compiler::PrettierFormatter;
use jinja_watch::config::{GlobalConfig, CONFIG_FILE_NAME};
use jinja_watch::discovery;
use jinja_watch::entities::{EntityFetcher, HttpEntityFetcher};

use crate::cli::{FormatterKind, RunArgs};
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::views::check::{render_check_items, CheckItem};
use crate::ui::views::watch::render_watch_header;

pub fn cmd_check(args: &RunArgs, json: bool) -> Result<()> {
    let ui = UiContext::new(json);
    let root = super::resolve_root(args);
    let mut items = Vec::new();

    let root_ok = root.is_dir();
    items.push(if root_ok {
        CheckItem::pass("root", root.display().to_string())
    } else {
        CheckItem::fail("root", format!("not a directory: {}", root.display()))
    });

    let config_path = root.join(CONFIG_FILE_NAME);
    let config = match GlobalConfig::load(&config_path) {
        Ok(config) => {
            let detail = if config_path.exists() {
                format!(
                    "{} variables, {} file overrides, {} skipped",
                    config.variables().len(),
                    config.file_config_count(),
                    config.skipped_files().count()
                )
            } else {
                format!("{} not present, using empty configuration", CONFIG_FILE_NAME)
            };
            items.push(CheckItem::pass("config", detail));
            Some(config)
        }
        Err(e) => {
            items.push(CheckItem::fail("config", e.to_string()));
            None
        }
    };

    if root_ok {
        let templates = discovery::scan(&root, &config.unwrap_or_default());
        items.push(match templates {
            Ok(templates) => CheckItem::pass("templates", format!("{} found", templates.len())),
            Err(e) => CheckItem::fail("templates", e.to_string()),
        });
    }

    items.push(match args.formatter {
        FormatterKind::Prettier => match PrettierFormatter::default().ensure_installed() {
            Ok(path) => CheckItem::pass("formatter", path.display().to_string()),
            Err(e) => CheckItem::fail("formatter", e.to_string()),
        },
        FormatterKind::Disabled => CheckItem::pass("formatter", "disabled"),
    });

    items.push(match &args.token {
        Some(token) => match HttpEntityFetcher::new(args.entities_url.clone(), token.clone()).fetch() {
            Ok(records) => CheckItem::pass("entities", format!("{} entities", records.len())),
            Err(e) => CheckItem::fail("entities", e.to_string()),
        },
        None => CheckItem::pass("entities", "disabled (no token)"),
    });

    let failed = items.iter().filter(|i| !i.ok).count();
    if json {
        let output = serde_json::json!({
            "command": "check",
            "success": failed == 0,
            "checks": items,
        });
        println!("{}", output);
    } else {
        print!(
            "{}",
            render_watch_header(
                "jinja-watch check",
                Icon::Check,
                &root.display().to_string(),
                &[],
                ui.color,
                ui.unicode
            )
        );
        print!("{}", render_check_items(&items, ui.color, ui.unicode));
    }

    if failed > 0 {
        bail!("{} check(s) failed", failed);
    }
    Ok(())
}
