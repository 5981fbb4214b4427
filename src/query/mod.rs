pub mod engine;
pub mod heatmap;
pub mod models;

pub use engine::QueryEngine;
pub use heatmap::{HeatmapDay, HeatmapMode, HeatmapReport, SampleError, WeekSample};
pub use models::*;
