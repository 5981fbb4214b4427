//! Snapshot table layouts
//!
//! Repopulse never creates these tables in a served database; the scraper
//! does. The statements here describe the columns every query relies on and
//! are used to build fixture databases.

use crate::catalog::TableName;

/// Columns of a `repo_<date>` table
pub const REPO_COLUMNS: &str = r#"
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    full_name TEXT,
    owner_login TEXT,
    stars INTEGER NOT NULL DEFAULT 0,
    forks INTEGER NOT NULL DEFAULT 0,
    open_issues INTEGER NOT NULL DEFAULT 0,
    contributors INTEGER NOT NULL DEFAULT 0,
    language TEXT,
    description TEXT,
    url TEXT
"#;

/// Columns of a `repo_contributors_<date>` table
pub const CONTRIBUTOR_COLUMNS: &str = r#"
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    login TEXT,
    company TEXT,
    location TEXT,
    repo_id INTEGER NOT NULL
"#;

/// Columns of a `repo_activity_<date>` table.
///
/// `week_start` is optional in scraped data; only weekly heatmap
/// aggregation reads it.
pub const ACTIVITY_COLUMNS: &str = r#"
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo_name TEXT NOT NULL,
    repo_id INTEGER NOT NULL,
    week_start TEXT,
    day_commits TEXT
"#;

/// `CREATE TABLE` statement for the given table and column list
pub fn create_table_sql(table: &TableName, columns: &str) -> String {
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table.quoted(), columns)
}
