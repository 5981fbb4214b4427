use tabled::{settings::Style, Table, Tabled};

use crate::catalog::Snapshot;
use crate::query::LanguageCount;

#[derive(Tabled)]
pub struct SnapshotRow {
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Table")]
    pub table: String,
    #[tabled(rename = "Captured")]
    pub captured: String,
}

impl From<&Snapshot> for SnapshotRow {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            kind: snapshot.kind.to_string(),
            table: snapshot.table.to_string(),
            captured: snapshot
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Tabled)]
pub struct LanguageRow {
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Repos")]
    pub count: i64,
    #[tabled(rename = "Stars")]
    pub total_stars: i64,
    #[tabled(rename = "Forks")]
    pub total_forks: i64,
}

impl From<&LanguageCount> for LanguageRow {
    fn from(row: &LanguageCount) -> Self {
        Self {
            language: row.language.clone(),
            count: row.count,
            total_stars: row.total_stars,
            total_forks: row.total_forks,
        }
    }
}

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Rounded table, or an empty string when there are no rows
pub fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn snapshots_table(snapshots: &[Snapshot]) -> String {
    let rows: Vec<SnapshotRow> = snapshots.iter().map(SnapshotRow::from).collect();
    render(&rows)
}

pub fn languages_table(languages: &[LanguageCount]) -> String {
    let rows: Vec<LanguageRow> = languages.iter().map(LanguageRow::from).collect();
    render(&rows)
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let rows: Vec<TableRow> = stats
        .iter()
        .map(|(metric, value)| TableRow {
            metric: metric.to_string(),
            value: value.to_string(),
        })
        .collect();
    render(&rows)
}
