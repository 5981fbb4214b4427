//! Fixture databases shaped like the scraper's output

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use rusqlite::{params, Connection};
use tempfile::TempDir;

use repopulse::storage::schema::{create_table_sql, ACTIVITY_COLUMNS, CONTRIBUTOR_COLUMNS, REPO_COLUMNS};
use repopulse::storage::{Database, PoolSettings};
use repopulse::TableName;

pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
    conn: Connection,
}

/// A repository row; fields left unset keep the column defaults
#[derive(Default)]
pub struct Repo<'a> {
    pub name: &'a str,
    pub owner: &'a str,
    pub language: Option<&'a str>,
    pub stars: i64,
    pub forks: i64,
    pub open_issues: i64,
    pub contributors: i64,
}

impl<'a> Repo<'a> {
    pub fn new(name: &'a str, language: Option<&'a str>, stars: i64) -> Self {
        Self {
            name,
            owner: "octo",
            language,
            stars,
            ..Default::default()
        }
    }
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("github.db");
        let conn = Connection::open(&path).unwrap();
        Self { _dir: dir, path, conn }
    }

    fn create(&self, table: &str, columns: &str) -> TableName {
        let table = TableName::new(table).unwrap();
        self.conn.execute_batch(&create_table_sql(&table, columns)).unwrap();
        table
    }

    pub fn repos(&self, table: &str, repos: &[Repo<'_>]) -> &Self {
        let table = self.create(table, REPO_COLUMNS);
        let sql = format!(
            "INSERT INTO {} (id, name, full_name, owner_login, stars, forks, open_issues, contributors, language, description, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            table.quoted()
        );
        for (i, repo) in repos.iter().enumerate() {
            let full_name = format!("{}/{}", repo.owner, repo.name);
            self.conn
                .execute(
                    &sql,
                    params![
                        i as i64 + 1,
                        repo.name,
                        full_name,
                        repo.owner,
                        repo.stars,
                        repo.forks,
                        repo.open_issues,
                        repo.contributors,
                        repo.language,
                        format!("About {}", repo.name),
                        format!("https://github.com/{}", full_name),
                    ],
                )
                .unwrap();
        }
        self
    }

    /// Contributors as `(company, location, repo_id)`
    pub fn contributors(&self, table: &str, rows: &[(Option<&str>, Option<&str>, i64)]) -> &Self {
        let table = self.create(table, CONTRIBUTOR_COLUMNS);
        let sql = format!(
            "INSERT INTO {} (login, company, location, repo_id) VALUES (?1, ?2, ?3, ?4)",
            table.quoted()
        );
        for (i, (company, location, repo_id)) in rows.iter().enumerate() {
            self.conn
                .execute(&sql, params![format!("user{}", i), company, location, repo_id])
                .unwrap();
        }
        self
    }

    /// Activity rows as `(repo_name, repo_id, week_start, day_commits)`
    pub fn activity(&self, table: &str, rows: &[(&str, i64, Option<&str>, Option<&str>)]) -> &Self {
        let table = self.create(table, ACTIVITY_COLUMNS);
        let sql = format!(
            "INSERT INTO {} (repo_name, repo_id, week_start, day_commits) VALUES (?1, ?2, ?3, ?4)",
            table.quoted()
        );
        for (name, id, week_start, day_commits) in rows {
            self.conn.execute(&sql, params![name, id, week_start, day_commits]).unwrap();
        }
        self
    }

    /// Run raw SQL, for values the typed helpers cannot express
    pub fn execute(&self, sql: &str) -> &Self {
        self.conn.execute_batch(sql).unwrap();
        self
    }

    pub fn database(&self) -> Database {
        Database::open(
            &self.path,
            PoolSettings {
                max_size: 4,
                connection_timeout: Duration::from_secs(2),
            },
        )
        .unwrap()
    }
}
