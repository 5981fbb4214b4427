//! Row shapes returned by the query layer
//!
//! Field names are the JSON keys the dashboard front end reads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Repositories per language in the latest snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub language: String,
    pub count: i64,
    pub total_stars: i64,
    pub total_forks: i64,
}

/// Contributors per company in the latest contributor snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCount {
    pub company: String,
    pub contributor_count: i64,
    /// Distinct repositories those contributors appear in
    pub repo_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarsContributorsPoint {
    pub repo_name: String,
    pub stars: i64,
    pub contributors_count: i64,
    pub forks: i64,
    pub open_issues: i64,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarsIssuesPoint {
    pub repo_name: String,
    pub stars: i64,
    pub open_issues: i64,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
    pub location: String,
    pub contributor_count: i64,
}

/// A repository that has rows in the latest activity snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRepository {
    pub repo_name: String,
    pub repo_id: i64,
}

/// Repository count for one language on one capture date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: i64,
}

/// One line of the language trend chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSeries {
    /// Language name
    pub name: String,
    /// Points in ascending date order
    pub data: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRepo {
    pub repo_name: String,
    pub full_name: Option<String>,
    pub stars: i64,
    pub forks: i64,
    pub language: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopRepository {
    pub repo_id: i64,
    pub name: String,
    pub full_name: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: i64,
    pub forks: i64,
    pub url: Option<String>,
    /// Stars in the snapshot roughly one month before the latest, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars_month_ago: Option<i64>,
}

/// Result of the connectivity probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` or `"error"`
    pub status: String,
    pub message: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Database connection succeeded".to_string(),
        }
    }

    pub fn error() -> Self {
        Self {
            status: "error".to_string(),
            message: "Database connection failed".to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
