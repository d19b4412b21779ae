//! SQLite connection and schema for the history database.
//!
//! A history database is a single file holding the `telegram_history` table.
//! Schema creation is idempotent and never destructive, so opening an existing
//! file keeps every stored record. Files written by the earlier Telegram bot use
//! the same table name and open with their history intact.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use super::error::{HistoryError, HistoryResult};

/// Location string that opens a private in-memory database.
pub const IN_MEMORY_LOCATION: &str = ":memory:";

/// Schema for the history database.
const SCHEMA: &str = r#"
-- One row per conversational turn, user input and bot replies alike
CREATE TABLE IF NOT EXISTS telegram_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    message TEXT NOT NULL,
    timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

-- Covers the bounded newest-first read and the per-user purge
CREATE INDEX IF NOT EXISTS idx_telegram_history_user_order
    ON telegram_history(user_id, timestamp, id);
"#;

/// Pool connections for file-backed databases. SQLite still admits one writer at a time.
const MAX_FILE_CONNECTIONS: u32 = 5;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// History database connection pool.
#[derive(Debug, Clone)]
pub struct HistoryDb {
    pool: SqlitePool,
    path: PathBuf,
}

impl HistoryDb {
    /// Open or create the history database at `location`.
    ///
    /// Creates the database file and parent directories if they don't exist.
    /// `:memory:` opens a private in-memory database instead.
    pub async fn open(location: &Path) -> HistoryResult<Self> {
        if location == Path::new(IN_MEMORY_LOCATION) {
            return Self::in_memory().await;
        }

        // Ensure parent directory exists
        if let Some(parent) = location.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                HistoryError::unavailable(
                    location,
                    format!("creating database directory {}: {e}", parent.display()),
                    None,
                )
            })?;
        }

        // The path is handed to SQLite as-is; `%` and `?` are valid file name characters.
        let options = SqliteConnectOptions::new()
            .filename(location)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_FILE_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| HistoryError::unavailable(location, "connecting to database", Some(e)))?;

        let db = Self {
            pool,
            path: location.to_path_buf(),
        };
        db.initialize_schema().await?;

        debug!("opened history database at {}", location.display());
        Ok(db)
    }

    /// Create an in-memory database (for testing).
    pub async fn in_memory() -> HistoryResult<Self> {
        let location = Path::new(IN_MEMORY_LOCATION);
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| {
                HistoryError::unavailable(location, "parsing in-memory database URL", Some(e))
            })?;

        // Every connection to sqlite::memory: is its own database, so the pool
        // must keep exactly one connection alive for the lifetime of the store.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                HistoryError::unavailable(location, "connecting to in-memory database", Some(e))
            })?;

        let db = Self {
            pool,
            path: location.to_path_buf(),
        };
        db.initialize_schema().await?;
        Ok(db)
    }

    /// Initialize the database schema.
    async fn initialize_schema(&self) -> HistoryResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                HistoryError::unavailable(&self.path, "initializing history schema", Some(e))
            })?;
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the database connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check if the database is healthy.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}
