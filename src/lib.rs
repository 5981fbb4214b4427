//! # Repopulse - GitHub snapshot dashboard backend
//!
//! Read-only aggregation service over periodically scraped GitHub snapshot
//! tables (`repo_<date>`, `repo_contributors_<date>`, `repo_activity_<date>`).
//!
//! Repopulse provides:
//! - A pooled SQLite storage handle injected into every query
//! - A snapshot catalog that resolves the latest table per category
//! - Aggregation queries for languages, companies, locations and stars
//! - A heatmap reshaper turning weekly commit arrays into a 365-day calendar
//! - An axum HTTP facade exposing each query as a GET endpoint

pub mod catalog;
pub mod config;
pub mod output;
pub mod palette;
pub mod query;
pub mod server;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use catalog::{LatestTables, SnapshotCatalog, SnapshotKind, TableName};
pub use query::{HeatmapDay, HeatmapMode, QueryEngine};
pub use storage::Database;

/// Result type alias for Repopulse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Repopulse operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid heatmap mode: {0}")]
    InvalidMode(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
