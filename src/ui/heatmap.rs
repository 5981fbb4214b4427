//! Terminal rendering of the activity calendar

use owo_colors::OwoColorize;

use crate::query::HeatmapDay;
use crate::ui::{theme, Theme};

const GLYPHS: [&str; 5] = ["·", "░", "▒", "▓", "█"];
const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Shade level 0..=4 relative to the busiest day
pub fn shade(count: u64, max: u64) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    // 1..=4 by quartile of the maximum, widened so huge counts cannot overflow
    ((u128::from(count) * 4).div_ceil(u128::from(max)) as usize).clamp(1, 4)
}

pub fn render_heatmap(days: &[HeatmapDay]) -> String {
    render_heatmap_with(days, theme())
}

/// One row per weekday, one column per calendar week, oldest on the left
pub fn render_heatmap_with(days: &[HeatmapDay], theme: &Theme) -> String {
    let Some(first) = days.first() else {
        return String::new();
    };
    let max = days.iter().map(|d| d.count).max().unwrap_or(0);
    let lead = first.weekday as usize;
    let columns = (lead + days.len()).div_ceil(7);

    let mut grid = vec![vec![" ".to_string(); columns]; 7];
    for (i, day) in days.iter().enumerate() {
        let cell = lead + i;
        let level = shade(day.count, max);
        grid[cell % 7][cell / 7] = GLYPHS[level].style(theme.shades[level].clone()).to_string();
    }

    let mut out = String::new();
    for (weekday, row) in grid.iter().enumerate() {
        out.push_str(WEEKDAY_LABELS[weekday]);
        out.push(' ');
        out.push_str(&row.concat());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::heatmap::align_to_calendar;
    use chrono::NaiveDate;

    #[test]
    fn test_shade_levels() {
        assert_eq!(shade(0, 10), 0);
        assert_eq!(shade(1, 10), 1);
        assert_eq!(shade(5, 10), 2);
        assert_eq!(shade(10, 10), 4);
        assert_eq!(shade(3, 0), 0);
        assert_eq!(shade(u64::MAX, u64::MAX), 4);
        assert_eq!(shade(u64::MAX / 2, u64::MAX), 2);
    }

    #[test]
    fn test_render_grid_shape() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        let days = align_to_calendar(&[0, 0, 0, 0, 0, 0, 9], today);
        let rendered = render_heatmap_with(&days, &Theme::plain());

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("Sun "));
        // Today is a Tuesday and holds the only commits
        assert!(lines[2].contains('█'));
        assert_eq!(rendered.matches('█').count(), 1);
    }

    #[test]
    fn test_render_empty() {
        assert!(render_heatmap_with(&[], &Theme::plain()).is_empty());
    }
}
