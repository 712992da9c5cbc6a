//! SQLite connection pool with a single-writer gate.
//!
//! Every mutating statement goes through [`Database::write`], which holds an
//! async mutex for the duration of the statement. Reads use the pool directly
//! and may run concurrently. Writes that hit `SQLITE_BUSY`/`SQLITE_LOCKED`
//! (another process holding the file) are retried with jittered backoff.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use serde_json::json;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tokio::sync::Mutex;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::config::Config;
use crate::error::{AppError, is_busy_error};

/// Maximum number of retries for a write that found the database busy.
const WRITE_RETRIES: usize = 3;

pub struct Database {
    pool: SqlitePool,
    write_gate: Mutex<()>,
}

impl Database {
    /// Opens (creating if missing) the database file named by `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed URL and
    /// [`AppError::Internal`] if the pool cannot connect.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| {
                AppError::bad_request("Invalid DATABASE_URL", json!({ "reason": e.to_string() }))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.db_busy_timeout));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// A private in-memory database, migrated and ready to use.
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self::from_pool(pool);
        db.migrate().await?;
        Ok(db)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_gate: Mutex::new(()),
        }
    }

    /// Applies the embedded migrations in `./migrations`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Pool for read-only queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs a mutating operation under the write gate.
    ///
    /// `op` may be invoked more than once when the database reports busy.
    pub async fn write<T, F, Fut>(&self, mut op: F) -> Result<T, AppError>
    where
        F: FnMut(SqlitePool) -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let _guard = self.write_gate.lock().await;

        let strategy = ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_millis(500))
            .map(jitter)
            .take(WRITE_RETRIES);

        RetryIf::start(strategy, || op(self.pool.clone()), is_busy_error)
            .await
            .map_err(AppError::from)
    }

    /// Round-trips a trivial query.
    pub async fn check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
