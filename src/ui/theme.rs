use crossterm::style::Color;

/// Design tokens for jinja-watch terminal output.
///
/// All colors and icons come from this module.
pub mod colors {
    use super::Color;

    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const INFO: Color = Color::Cyan;
    pub const DIM: Color = Color::DarkGrey;
}

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const PROGRESS: &str = "●";
    pub const SKIPPED: &str = "○";
    pub const ARROW: &str = "↳";
    pub const WATCH: &str = "⟳";
    pub const CHECK: &str = "🔍";
    pub const BUILD: &str = "⚙";
    pub const TRASH: &str = "🗑";
}

pub mod icons_ascii {
    pub const SUCCESS: &str = "[OK]";
    pub const ERROR: &str = "[FAIL]";
    pub const WARNING: &str = "[WARN]";
    pub const PROGRESS: &str = "[..]";
    pub const SKIPPED: &str = "[SKIP]";
    pub const ARROW: &str = "[>]";
    pub const WATCH: &str = "[~]";
    pub const CHECK: &str = "[CHECK]";
    pub const BUILD: &str = "[BUILD]";
    pub const TRASH: &str = "[DEL]";
}
