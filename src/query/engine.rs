//! Query engine implementation
//!
//! Provides the dashboard aggregations:
//! - Language, company and location distributions
//! - Star/contributor and star/issue scatter data
//! - Activity heatmaps
//! - Language trends across every dated snapshot
//! - Top repositories with month-over-month star history
//!
//! Every public query resolves the snapshot tables it needs at call time and
//! returns an empty `Vec` when they are missing or a query fails. Failures
//! are logged, not returned.

use std::collections::HashMap;

use chrono::{Days, Months, NaiveDate};
use rusqlite::params_from_iter;
use rusqlite::types::ValueRef;

use super::heatmap::{self, ActivityRow, HeatmapDay, HeatmapMode, HeatmapReport};
use super::models::*;
use crate::catalog::{resolve_latest_tables, LatestTables, Snapshot, SnapshotCatalog, SnapshotKind, TableName};
use crate::storage::Database;
use crate::Result;

/// Cap for language and company distributions
pub const DISTRIBUTION_LIMIT: usize = 15;
/// Cap for contributor locations
pub const LOCATION_LIMIT: usize = 30;
/// Uncapped scatter queries warn above this many rows
pub const LARGE_RESULT_WARNING: usize = 1000;
/// Cap for the top repositories listing
pub const TOP_REPOSITORIES_LIMIT: usize = 1500;
/// Default and maximum for `language_top_repos`
pub const DEFAULT_LANGUAGE_REPOS: usize = 6;
pub const MAX_LANGUAGE_REPOS: usize = 100;
/// How far before the one-month target a comparison snapshot may be
pub const MONTH_AGO_WINDOW_DAYS: u64 = 31;
/// Names per `IN (...)` lookup when enriching top repositories
const ENRICH_BATCH: usize = 500;

/// Query engine over one database handle
pub struct QueryEngine<'a> {
    db: &'a Database,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn tables(&self) -> LatestTables {
        resolve_latest_tables(self.db)
    }

    /// Probe the pool with one connection
    pub fn health(&self) -> HealthStatus {
        match self.db.ping() {
            Ok(()) => HealthStatus::ok(),
            Err(e) => {
                tracing::error!("Database health check failed: {}", e);
                HealthStatus::error()
            }
        }
    }

    /// Every catalogued snapshot table
    pub fn snapshots(&self) -> Vec<Snapshot> {
        or_empty("snapshot catalog", SnapshotCatalog::load(self.db).map(|c| c.iter().cloned().collect()))
    }

    // ========== Distributions ==========

    /// Repositories per non-empty language, most common first, capped at 15
    pub fn language_distribution(&self) -> Vec<LanguageCount> {
        or_empty("language distribution", self.try_language_distribution())
    }

    fn try_language_distribution(&self) -> Result<Vec<LanguageCount>> {
        let Some(table) = self.tables().repo_table else {
            return Ok(Vec::new());
        };
        tracing::info!("Querying language distribution from {}", table);

        let sql = format!(
            "SELECT language, COUNT(*) AS count, COALESCE(SUM(stars), 0), COALESCE(SUM(forks), 0)
             FROM {}
             WHERE language IS NOT NULL AND language != ''
             GROUP BY language
             ORDER BY count DESC
             LIMIT ?1",
            table.quoted()
        );

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([DISTRIBUTION_LIMIT as i64], |row| {
                Ok(LanguageCount {
                    language: row.get(0)?,
                    count: row.get(1)?,
                    total_stars: row.get(2)?,
                    total_forks: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Contributors per non-empty company, most common first, capped at 15
    pub fn company_distribution(&self) -> Vec<CompanyCount> {
        or_empty("company distribution", self.try_company_distribution())
    }

    fn try_company_distribution(&self) -> Result<Vec<CompanyCount>> {
        let Some(table) = self.tables().contributor_table else {
            return Ok(Vec::new());
        };
        tracing::info!("Querying company distribution from {}", table);

        let sql = format!(
            "SELECT company, COUNT(*) AS contributor_count, COUNT(DISTINCT repo_id) AS repo_count
             FROM {}
             WHERE company IS NOT NULL AND company != ''
             GROUP BY company
             ORDER BY contributor_count DESC
             LIMIT ?1",
            table.quoted()
        );

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([DISTRIBUTION_LIMIT as i64], |row| {
                Ok(CompanyCount {
                    company: row.get(0)?,
                    contributor_count: row.get(1)?,
                    repo_count: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Contributors per non-empty location, most common first, capped at 30
    pub fn contributor_locations(&self) -> Vec<LocationCount> {
        or_empty("contributor locations", self.try_contributor_locations())
    }

    fn try_contributor_locations(&self) -> Result<Vec<LocationCount>> {
        let Some(table) = self.tables().contributor_table else {
            return Ok(Vec::new());
        };
        tracing::info!("Querying contributor locations from {}", table);

        let sql = format!(
            "SELECT location, COUNT(*) AS contributor_count
             FROM {}
             WHERE location IS NOT NULL AND location != ''
             GROUP BY location
             ORDER BY contributor_count DESC
             LIMIT ?1",
            table.quoted()
        );

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([LOCATION_LIMIT as i64], |row| {
                Ok(LocationCount {
                    location: row.get(0)?,
                    contributor_count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    // ========== Scatter data ==========

    /// Every repository with contributors, by stars descending. Uncapped.
    pub fn stars_contributors_relation(&self) -> Vec<StarsContributorsPoint> {
        or_empty("stars/contributors relation", self.try_stars_contributors_relation())
    }

    fn try_stars_contributors_relation(&self) -> Result<Vec<StarsContributorsPoint>> {
        let Some(table) = self.tables().repo_table else {
            return Ok(Vec::new());
        };
        tracing::info!("Querying stars/contributors relation from {}", table);

        let sql = format!(
            "SELECT name, COALESCE(stars, 0), contributors, COALESCE(forks, 0), COALESCE(open_issues, 0), language
             FROM {}
             WHERE contributors > 0
             ORDER BY stars DESC",
            table.quoted()
        );

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StarsContributorsPoint {
                    repo_name: row.get(0)?,
                    stars: row.get(1)?,
                    contributors_count: row.get(2)?,
                    forks: row.get(3)?,
                    open_issues: row.get(4)?,
                    language: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        warn_if_large("stars/contributors relation", rows.len());
        Ok(rows)
    }

    /// Every repository with open issues, by stars descending. Uncapped.
    pub fn stars_issues_relation(&self) -> Vec<StarsIssuesPoint> {
        or_empty("stars/issues relation", self.try_stars_issues_relation())
    }

    fn try_stars_issues_relation(&self) -> Result<Vec<StarsIssuesPoint>> {
        let Some(table) = self.tables().repo_table else {
            return Ok(Vec::new());
        };
        tracing::info!("Querying stars/issues relation from {}", table);

        let sql = format!(
            "SELECT name, COALESCE(stars, 0), open_issues, language
             FROM {}
             WHERE open_issues > 0
             ORDER BY stars DESC",
            table.quoted()
        );

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StarsIssuesPoint {
                    repo_name: row.get(0)?,
                    stars: row.get(1)?,
                    open_issues: row.get(2)?,
                    language: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        warn_if_large("stars/issues relation", rows.len());
        Ok(rows)
    }

    // ========== Activity ==========

    /// Distinct repositories present in the latest activity snapshot, by name
    pub fn repositories_with_activity(&self) -> Vec<ActiveRepository> {
        or_empty("repositories with activity", self.try_repositories_with_activity())
    }

    fn try_repositories_with_activity(&self) -> Result<Vec<ActiveRepository>> {
        let Some(table) = self.tables().activity_table else {
            tracing::warn!("No activity table found, cannot list repositories");
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT DISTINCT repo_name, repo_id FROM {} ORDER BY repo_name ASC",
            table.quoted()
        );

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ActiveRepository {
                    repo_name: row.get(0)?,
                    repo_id: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::info!("Found {} repositories with activity in {}", rows.len(), table);
        Ok(rows)
    }

    /// 365-day calendar for one repository, or for all rows when `repo_name`
    /// is `None`. Empty when there is no activity data.
    pub fn activity_heatmap(&self, repo_name: Option<&str>, mode: HeatmapMode, today: NaiveDate) -> Vec<HeatmapDay> {
        self.activity_heatmap_report(repo_name, mode, today).days
    }

    /// Like [`QueryEngine::activity_heatmap`], keeping the discarded rows
    pub fn activity_heatmap_report(&self, repo_name: Option<&str>, mode: HeatmapMode, today: NaiveDate) -> HeatmapReport {
        let target = repo_name.unwrap_or("(all repositories)");

        let rows = match self.try_activity_rows(repo_name, mode) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Failed to load activity heatmap for {}: {}", target, e);
                return HeatmapReport::default();
            }
        };

        if rows.is_empty() {
            tracing::warn!("No activity rows found for {}", target);
            return HeatmapReport::default();
        }

        let report = heatmap::reshape(&rows, mode, today);
        if !report.discarded.is_empty() {
            tracing::warn!(
                "Discarded {} of {} activity rows for {}",
                report.discarded.len(),
                report.rows,
                target
            );
        }
        tracing::info!("Built {}-day heatmap for {} ({} mode)", report.days.len(), target, mode);
        report
    }

    fn try_activity_rows(&self, repo_name: Option<&str>, mode: HeatmapMode) -> Result<Vec<ActivityRow>> {
        let Some(table) = self.tables().activity_table else {
            tracing::warn!("No activity table found, returning empty heatmap");
            return Ok(Vec::new());
        };

        let columns = match mode {
            HeatmapMode::Concat => "day_commits, NULL",
            HeatmapMode::Weekly => "day_commits, week_start",
        };
        let mut sql = format!("SELECT {} FROM {}", columns, table.quoted());
        if repo_name.is_some() {
            sql.push_str(" WHERE repo_name = ?1");
        }

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = match repo_name {
            Some(name) => stmt.query_map([name], row_to_activity)?.collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt.query_map([], row_to_activity)?.collect::<rusqlite::Result<Vec<_>>>()?,
        };

        Ok(rows)
    }

    // ========== Trends ==========

    /// Repository count per language for every dated repository snapshot.
    ///
    /// Series appear in order of first appearance; points within a series are
    /// ascending by date.
    pub fn language_trends(&self) -> Vec<LanguageSeries> {
        or_empty("language trends", self.try_language_trends())
    }

    fn try_language_trends(&self) -> Result<Vec<LanguageSeries>> {
        let catalog = SnapshotCatalog::load(self.db)?;
        let snapshots = catalog.dated_repo_snapshots();
        if snapshots.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!("Building language trends from {} snapshots", snapshots.len());

        let conn = self.db.conn()?;
        let mut series: Vec<LanguageSeries> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for snapshot in snapshots {
            let Some(date) = snapshot.date else {
                continue;
            };
            let sql = format!(
                "SELECT language, COUNT(*) AS repo_count
                 FROM {}
                 WHERE language IS NOT NULL AND language != ''
                 GROUP BY language",
                snapshot.table.quoted()
            );
            let mut stmt = conn.prepare(&sql)?;
            let counts = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for (language, count) in counts {
                let slot = *index.entry(language.clone()).or_insert_with(|| {
                    series.push(LanguageSeries {
                        name: language,
                        data: Vec::new(),
                    });
                    series.len() - 1
                });
                series[slot].data.push(TrendPoint { date, count });
            }
        }

        Ok(series)
    }

    // ========== Repository listings ==========

    /// Highest-starred repositories in one language.
    ///
    /// `limit` defaults to 6 and is clamped to `1..=100`.
    pub fn language_top_repos(&self, language: &str, limit: Option<usize>) -> Vec<LanguageRepo> {
        let limit = limit
            .unwrap_or(DEFAULT_LANGUAGE_REPOS)
            .clamp(1, MAX_LANGUAGE_REPOS);
        or_empty("language top repositories", self.try_language_top_repos(language, limit))
    }

    fn try_language_top_repos(&self, language: &str, limit: usize) -> Result<Vec<LanguageRepo>> {
        let Some(table) = self.tables().repo_table else {
            return Ok(Vec::new());
        };
        tracing::info!("Querying top {} repositories from {}", language, table);

        let sql = format!(
            "SELECT name, full_name, COALESCE(stars, 0), COALESCE(forks, 0), language, description
             FROM {}
             WHERE language = ?1
             ORDER BY stars DESC
             LIMIT ?2",
            table.quoted()
        );

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params![language, limit as i64], |row| {
                Ok(LanguageRepo {
                    repo_name: row.get(0)?,
                    full_name: row.get(1)?,
                    stars: row.get(2)?,
                    forks: row.get(3)?,
                    language: row.get(4)?,
                    description: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Up to 1500 repositories by stars, with `stars_month_ago` filled from
    /// the newest snapshot captured at least one month before the latest.
    pub fn top_repositories(&self) -> Vec<TopRepository> {
        or_empty("top repositories", self.try_top_repositories())
    }

    fn try_top_repositories(&self) -> Result<Vec<TopRepository>> {
        let catalog = SnapshotCatalog::load(self.db)?;
        let Some(latest) = catalog.latest(SnapshotKind::Repository) else {
            return Ok(Vec::new());
        };
        tracing::info!("Querying top repositories from {}", latest.table);

        let sql = format!(
            "SELECT id, name, full_name, owner_login, description, language, COALESCE(stars, 0), COALESCE(forks, 0), url
             FROM {}
             ORDER BY stars DESC
             LIMIT ?1",
            latest.table.quoted()
        );

        let mut repos = {
            let conn = self.db.conn()?;
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_map([TOP_REPOSITORIES_LIMIT as i64], |row| {
                Ok(TopRepository {
                    repo_id: row.get(0)?,
                    name: row.get(1)?,
                    full_name: row.get(2)?,
                    owner: row.get(3)?,
                    description: row.get(4)?,
                    language: row.get(5)?,
                    stars: row.get(6)?,
                    forks: row.get(7)?,
                    url: row.get(8)?,
                    stars_month_ago: None,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        match month_ago_snapshot(&catalog, latest) {
            Some(prior) => {
                tracing::info!("Enriching with star history from {}", prior.table);
                self.enrich_month_ago(&prior.table, &mut repos);
            }
            None => tracing::debug!("No snapshot a month before {}, skipping star history", latest.table),
        }

        Ok(repos)
    }

    /// Best-effort: a failed batch is logged and leaves its rows unset.
    fn enrich_month_ago(&self, prior: &TableName, repos: &mut [TopRepository]) {
        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        let mut history: HashMap<String, i64> = HashMap::new();

        for batch in names.chunks(ENRICH_BATCH) {
            match self.prior_stars(prior, batch) {
                Ok(found) => {
                    for (name, stars) in found {
                        history.entry(name).or_insert(stars);
                    }
                }
                Err(e) => tracing::warn!("Failed to read star history from {}: {}", prior, e),
            }
        }

        for repo in repos.iter_mut() {
            repo.stars_month_ago = history.get(&repo.name).copied();
        }
    }

    fn prior_stars(&self, prior: &TableName, names: &[&str]) -> Result<Vec<(String, i64)>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "SELECT name, stars FROM {} WHERE name IN ({})",
            prior.quoted(),
            placeholders
        );

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(names.iter()), |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

/// The snapshot used for month-over-month comparison, computed from the
/// latest snapshot's own date.
///
/// Only snapshots captured within `MONTH_AGO_WINDOW_DAYS` before the
/// one-month target qualify; older history is not a month-ago value.
pub fn month_ago_snapshot<'c>(catalog: &'c SnapshotCatalog, latest: &Snapshot) -> Option<&'c Snapshot> {
    let target = latest.date?.checked_sub_months(Months::new(1))?;
    let earliest = target.checked_sub_days(Days::new(MONTH_AGO_WINDOW_DAYS))?;
    catalog
        .repo_snapshot_on_or_before(target)
        .filter(|s| s.table != latest.table)
        .filter(|s| s.date.is_some_and(|date| date >= earliest))
}

fn row_to_activity(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRow> {
    let mut non_text = None;
    let day_commits = text_column(row, 0, "day_commits", &mut non_text)?;
    let week_start = text_column(row, 1, "week_start", &mut non_text)?;
    Ok(ActivityRow {
        day_commits,
        week_start,
        non_text,
    })
}

/// Read a TEXT-or-NULL column. Other storage classes are recorded in
/// `non_text` so the row is rejected on its own instead of failing the query.
fn text_column(
    row: &rusqlite::Row<'_>,
    index: usize,
    column: &'static str,
    non_text: &mut Option<(&'static str, String)>,
) -> rusqlite::Result<Option<String>> {
    match row.get_ref(index)? {
        ValueRef::Null => Ok(None),
        ValueRef::Text(bytes) => Ok(Some(String::from_utf8_lossy(bytes).into_owned())),
        other => {
            non_text.get_or_insert_with(|| (column, other.data_type().to_string()));
            Ok(None)
        }
    }
}

fn or_empty<T>(what: &str, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!("Failed to load {}: {}", what, e);
        Vec::new()
    })
}

fn warn_if_large(what: &str, rows: usize) {
    if rows > LARGE_RESULT_WARNING {
        tracing::warn!("Large result for {}: {} rows, rendering may be slow", what, rows);
    }
}
