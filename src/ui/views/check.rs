use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

/// Result of one `check` probe
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CheckItem {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

impl CheckItem {
    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: true,
            detail: detail.into(),
        }
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: false,
            detail: detail.into(),
        }
    }
}

pub fn render_check_items(
    items: &[CheckItem],
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut out = String::new();
    for item in items {
        let icon = if item.ok { Icon::Success } else { Icon::Error };
        out.push_str(&format!(
            "  {} {}: {}\n",
            icon.colored(supports_color, supports_unicode),
            item.name,
            item.detail
        ));
    }

    let failed = items.iter().filter(|i| !i.ok).count();
    if failed == 0 {
        out.push_str(&format!(
            "\n{} {}\n",
            Icon::Success.colored(supports_color, supports_unicode),
            ColoredText::success("All checks passed").render(supports_color)
        ));
    } else {
        out.push_str(&format!(
            "\n{} {}\n",
            Icon::Error.colored(supports_color, supports_unicode),
            ColoredText::error(format!("{} check(s) failed", failed))
                .bold()
                .render(supports_color)
        ));
    }
    out
}
