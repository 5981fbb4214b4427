//! Snapshot table identity
//!
//! Table names follow the scraper's convention:
//! - `repo_<YYYYMMDD>` for repositories
//! - `repo_contributors_<YYYYMMDD>` for contributors
//! - `repo_activity_<YYYYMMDD>` for weekly commit activity

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Prefix shared by every repository snapshot table
pub const REPO_PREFIX: &str = "repo_";

/// Category a snapshot table belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    /// `repo_<date>`
    Repository,
    /// `repo_contributors_<date>`
    Contributors,
    /// `repo_activity_<date>`
    Activity,
}

impl SnapshotKind {
    /// Get the string representation of the snapshot kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Repository => "repository",
            SnapshotKind::Contributors => "contributors",
            SnapshotKind::Activity => "activity",
        }
    }

    /// Get all snapshot kinds
    pub fn all() -> &'static [SnapshotKind] {
        &[
            SnapshotKind::Repository,
            SnapshotKind::Contributors,
            SnapshotKind::Activity,
        ]
    }

    /// Classify a table name by substring rules.
    ///
    /// A name containing both `activity` and `contributors` counts as
    /// activity.
    pub fn classify(table: &str) -> Option<Self> {
        if table.contains("activity") {
            Some(SnapshotKind::Activity)
        } else if table.contains("contributors") {
            Some(SnapshotKind::Contributors)
        } else if table.starts_with(REPO_PREFIX) {
            Some(SnapshotKind::Repository)
        } else {
            None
        }
    }
}

impl FromStr for SnapshotKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "repository" | "repo" | "repos" => Ok(SnapshotKind::Repository),
            "contributors" | "contributor" => Ok(SnapshotKind::Contributors),
            "activity" => Ok(SnapshotKind::Activity),
            _ => Err(Error::InvalidTableName(format!("Unknown snapshot kind: {}", s))),
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A table name safe to splice into SQL through [`TableName::quoted`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.contains('\0') {
            return Err(Error::InvalidTableName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted SQL identifier with embedded quotes escaped
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }

    /// Trailing run of ASCII digits, if any
    pub fn suffix(&self) -> Option<&str> {
        static SUFFIX: OnceLock<Regex> = OnceLock::new();
        let re = SUFFIX.get_or_init(|| Regex::new(r"(\d+)$").expect("suffix pattern is valid"));
        re.captures(&self.0)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One catalogued snapshot table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub table: TableName,
    pub kind: SnapshotKind,
    /// Numeric value of the trailing digits, `None` when absent or too long
    pub suffix: Option<u64>,
    /// Capture date when the suffix is a valid `YYYYMMDD`
    pub date: Option<NaiveDate>,
}

impl Snapshot {
    /// Build a snapshot entry for a table, or `None` if the name does not
    /// match any category.
    pub fn from_table(name: &str) -> Option<Self> {
        let kind = SnapshotKind::classify(name)?;
        let table = TableName::new(name).ok()?;
        let digits = table.suffix();
        let suffix = digits.and_then(|d| d.parse::<u64>().ok());
        let date = digits.and_then(parse_capture_date);

        Some(Self {
            table,
            kind,
            suffix,
            date,
        })
    }
}

/// Parse an 8-digit `YYYYMMDD` suffix into a date
pub fn parse_capture_date(digits: &str) -> Option<NaiveDate> {
    if digits.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}
