pub mod heatmap;
pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use heatmap::render_heatmap;
pub use icons::Icons;
pub use output::{empty, error, header, info, section, success, warn};
pub use table::{languages_table, snapshots_table, stats_table};
pub use theme::{theme, Theme};
