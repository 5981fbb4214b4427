//! Storage Layer - pooled, read-only SQLite access
//!
//! The snapshot tables are owned by the external scraper:
//! - repo_<YYYYMMDD>(id, name, full_name, owner_login, stars, forks, open_issues, contributors, language, description, url)
//! - repo_contributors_<YYYYMMDD>(company, location, repo_id)
//! - repo_activity_<YYYYMMDD>(repo_name, repo_id, day_commits[, week_start])

pub mod schema;
pub mod sqlite;

pub use sqlite::{Database, PoolSettings};
