//! SQLite storage implementation

use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;

use crate::Result;

/// Pool sizing and acquisition policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum number of simultaneous connections
    pub max_size: u32,
    /// How long a caller waits for a free connection before failing
    pub connection_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 10,
            connection_timeout: Duration::from_secs(30),
        }
    }
}

/// Read-only handle over the snapshot database.
///
/// Cheap to clone; clones share the same pool. Construct one at startup and
/// pass it to whatever needs to query.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("max_size", &self.pool.max_size())
            .finish()
    }
}

impl Database {
    /// Open a pool over an existing database file.
    ///
    /// Connections are opened lazily, so a missing or unreachable file is
    /// reported by the first query (and by [`Database::ping`]) rather than
    /// here.
    pub fn open(path: &Path, settings: PoolSettings) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let manager = SqliteConnectionManager::file(path)
            .with_flags(flags)
            .with_init(|conn| conn.execute_batch("PRAGMA query_only = ON; PRAGMA busy_timeout = 5000;"));

        let pool = Pool::builder()
            .max_size(settings.max_size.max(1))
            .min_idle(Some(0))
            .connection_timeout(settings.connection_timeout)
            .build_unchecked(manager);

        tracing::debug!(
            "Opened pool over {} (max {} connections)",
            path.display(),
            settings.max_size
        );

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared concurrency bound
    pub fn max_size(&self) -> u32 {
        self.pool.max_size()
    }

    /// Acquire a pooled connection, waiting up to the configured timeout
    pub fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Check that a connection can be acquired and used
    pub fn ping(&self) -> Result<()> {
        let conn = self.conn()?;
        let _: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        Ok(())
    }

    /// List every table name, ascending by name
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(names)
    }
}
