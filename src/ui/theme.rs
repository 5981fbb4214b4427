//! Terminal styles for CLI output and the heatmap grid.
//!
//! Colour is used only when stdout is a terminal, so piped `repopulse
//! snapshots` output stays free of escape codes.

use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    /// Heatmap shades indexed by `ui::heatmap::shade`, from an empty day to
    /// the busiest quartile
    pub shades: [Style; 5],
}

impl Theme {
    pub fn detect() -> Self {
        if console::Term::stdout().is_term() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            shades: [
                Style::new().bright_black(),
                Style::new().green().dimmed(),
                Style::new().green(),
                Style::new().bright_green(),
                Style::new().bright_green().bold(),
            ],
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            shades: std::array::from_fn(|_| Style::new()),
        }
    }
}

/// Detected once, on first use
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
