//! GitHub linguist colours for the languages the dashboard charts

use std::collections::BTreeMap;

/// Colour for languages without an entry
pub const FALLBACK_COLOR: &str = "#ededed";

const LANGUAGE_COLORS: &[(&str, &str)] = &[
    ("JavaScript", "#f1e05a"),
    ("TypeScript", "#2b7489"),
    ("Python", "#3572A5"),
    ("Java", "#b07219"),
    ("Go", "#00ADD8"),
    ("C++", "#f34b7d"),
    ("C", "#555555"),
    ("PHP", "#4F5D95"),
    ("Ruby", "#701516"),
    ("Rust", "#dea584"),
    ("Scala", "#c22d40"),
    ("Swift", "#ffac45"),
    ("Kotlin", "#F18E33"),
    ("Dart", "#00B4AB"),
    ("Objective-C", "#438eff"),
];

/// Hex colour for a language name (exact, case-sensitive match)
pub fn language_color(language: &str) -> &'static str {
    LANGUAGE_COLORS
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

/// The full palette, keyed by language
pub fn language_colors() -> BTreeMap<&'static str, &'static str> {
    LANGUAGE_COLORS.iter().copied().collect()
}
