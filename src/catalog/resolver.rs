//! Snapshot catalog and latest-table resolution

use chrono::NaiveDate;
use serde::Serialize;

use super::snapshot::{Snapshot, SnapshotKind, TableName};
use crate::storage::Database;
use crate::Result;

/// The newest table per category, `None` when a category has no tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LatestTables {
    pub repo_table: Option<TableName>,
    pub contributor_table: Option<TableName>,
    pub activity_table: Option<TableName>,
}

/// Every snapshot table in the database, grouped by kind.
///
/// Each group is ordered newest first: descending by numeric suffix, with
/// unnumbered tables last. The sort is stable, so equal suffixes keep the
/// order the names were listed in.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    repositories: Vec<Snapshot>,
    contributors: Vec<Snapshot>,
    activity: Vec<Snapshot>,
}

impl SnapshotCatalog {
    /// Build a catalog from table names in enumeration order
    pub fn from_table_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();

        for name in names {
            let Some(snapshot) = Snapshot::from_table(name.as_ref()) else {
                continue;
            };
            match snapshot.kind {
                SnapshotKind::Repository => catalog.repositories.push(snapshot),
                SnapshotKind::Contributors => catalog.contributors.push(snapshot),
                SnapshotKind::Activity => catalog.activity.push(snapshot),
            }
        }

        for group in [
            &mut catalog.repositories,
            &mut catalog.contributors,
            &mut catalog.activity,
        ] {
            group.sort_by(|a, b| b.suffix.cmp(&a.suffix));
        }

        catalog
    }

    /// Load the catalog from the database's table listing
    pub fn load(db: &Database) -> Result<Self> {
        let names = db.list_tables()?;
        Ok(Self::from_table_names(names))
    }

    /// Snapshots of one kind, newest first
    pub fn snapshots(&self, kind: SnapshotKind) -> &[Snapshot] {
        match kind {
            SnapshotKind::Repository => &self.repositories,
            SnapshotKind::Contributors => &self.contributors,
            SnapshotKind::Activity => &self.activity,
        }
    }

    pub fn latest(&self, kind: SnapshotKind) -> Option<&Snapshot> {
        self.snapshots(kind).first()
    }

    pub fn latest_tables(&self) -> LatestTables {
        let table_of = |kind| self.latest(kind).map(|s: &Snapshot| s.table.clone());
        LatestTables {
            repo_table: table_of(SnapshotKind::Repository),
            contributor_table: table_of(SnapshotKind::Contributors),
            activity_table: table_of(SnapshotKind::Activity),
        }
    }

    /// Repository snapshots with a parseable capture date, oldest first
    pub fn dated_repo_snapshots(&self) -> Vec<&Snapshot> {
        let mut dated: Vec<&Snapshot> = self
            .repositories
            .iter()
            .filter(|s| s.date.is_some())
            .collect();
        dated.sort_by_key(|s| s.date);
        dated
    }

    /// Newest dated repository snapshot captured on or before `date`
    pub fn repo_snapshot_on_or_before(&self, date: NaiveDate) -> Option<&Snapshot> {
        self.repositories
            .iter()
            .filter(|s| s.date.is_some_and(|d| d <= date))
            .max_by_key(|s| s.date)
    }

    /// All snapshots across kinds
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.repositories
            .iter()
            .chain(self.contributors.iter())
            .chain(self.activity.iter())
    }

    pub fn len(&self) -> usize {
        self.repositories.len() + self.contributors.len() + self.activity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve the latest table per category.
///
/// A failure to list tables is logged and reported as "no tables".
pub fn resolve_latest_tables(db: &Database) -> LatestTables {
    match SnapshotCatalog::load(db) {
        Ok(catalog) => {
            let latest = catalog.latest_tables();
            tracing::debug!(
                "Resolved snapshot tables: repo={:?} contributors={:?} activity={:?}",
                latest.repo_table.as_ref().map(TableName::as_str),
                latest.contributor_table.as_ref().map(TableName::as_str),
                latest.activity_table.as_ref().map(TableName::as_str),
            );
            latest
        }
        Err(e) => {
            tracing::error!("Failed to list snapshot tables: {}", e);
            LatestTables::default()
        }
    }
}
