//! Snapshot catalog - typed view over date-suffixed snapshot tables
//!
//! Replaces string matching at every call site with one classification pass:
//! "latest", "all dated" and "on or before" become lookups on
//! [`SnapshotCatalog`].

pub mod resolver;
pub mod snapshot;

pub use resolver::{resolve_latest_tables, LatestTables, SnapshotCatalog};
pub use snapshot::{parse_capture_date, Snapshot, SnapshotKind, TableName};
