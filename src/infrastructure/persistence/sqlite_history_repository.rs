//! SQLite implementation of the probe audit log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::Database;
use crate::domain::entities::{HistoryEntry, NewHistoryEntry};
use crate::domain::repositories::HistoryRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    username: String,
    available: bool,
    outcome: String,
    status_code: Option<i64>,
    error_message: Option<String>,
    checked_at: DateTime<Utc>,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            identifier: row.username,
            available: row.available,
            outcome: row.outcome,
            status_code: row.status_code.and_then(|c| u16::try_from(c).ok()),
            error_message: row.error_message,
            checked_at: row.checked_at,
        }
    }
}

/// SQLite repository for the append-only audit log.
pub struct SqliteHistoryRepository {
    db: Arc<Database>,
}

impl SqliteHistoryRepository {
    /// Creates a new repository on a shared database handle.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn append(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, AppError> {
        let identifier = entry.identifier.as_str();
        let available = entry.availability == Some(true);
        let outcome = entry.outcome();
        let status_code = entry.status_code.map(i64::from);
        let error_message = entry.error_message.as_deref();
        let now = Utc::now();

        let row = self
            .db
            .write(move |pool| async move {
                sqlx::query_as::<_, HistoryRow>(
                    r#"
                    INSERT INTO check_history (username, available, outcome, status_code, error_message, checked_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    RETURNING id, username, available, outcome, status_code, error_message, checked_at
                    "#,
                )
                .bind(identifier)
                .bind(available)
                .bind(outcome)
                .bind(status_code)
                .bind(error_message)
                .bind(now)
                .fetch_one(&pool)
                .await
            })
            .await?;

        Ok(row.into())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM check_history")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    async fn count_available(&self) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM check_history WHERE available = 1")
                .fetch_one(self.db.pool())
                .await?;

        Ok(count)
    }

    async fn list_for(&self, identifier: &str, limit: i64) -> Result<Vec<HistoryEntry>, AppError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, username, available, outcome, status_code, error_message, checked_at
            FROM check_history
            WHERE username = ?
            ORDER BY checked_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(identifier)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }
}
