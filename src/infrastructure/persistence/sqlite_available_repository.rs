//! SQLite implementation of the available-username ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::Database;
use crate::domain::entities::available::STATUS_AVAILABLE;
use crate::domain::entities::{AvailableRecord, NewAvailableRecord};
use crate::domain::repositories::AvailableRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct AvailableRow {
    id: i64,
    username: String,
    status: String,
    created_at: DateTime<Utc>,
    checked_at: DateTime<Utc>,
    notes: Option<String>,
}

impl From<AvailableRow> for AvailableRecord {
    fn from(row: AvailableRow) -> Self {
        Self {
            id: row.id,
            identifier: row.username,
            status: row.status,
            created_at: row.created_at,
            checked_at: row.checked_at,
            notes: row.notes,
        }
    }
}

/// SQLite repository for the dedup ledger.
///
/// Uniqueness is enforced by the `UNIQUE` constraint on `username`.
pub struct SqliteAvailableRepository {
    db: Arc<Database>,
}

impl SqliteAvailableRepository {
    /// Creates a new repository on a shared database handle.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AvailableRepository for SqliteAvailableRepository {
    async fn create(&self, record: NewAvailableRecord) -> Result<AvailableRecord, AppError> {
        let identifier = record.identifier.as_str();
        let notes = record.notes.as_deref();
        let now = Utc::now();

        let row = self
            .db
            .write(move |pool| async move {
                sqlx::query_as::<_, AvailableRow>(
                    r#"
                    INSERT INTO available_usernames (username, status, created_at, checked_at, notes)
                    VALUES (?, ?, ?, ?, ?)
                    RETURNING id, username, status, created_at, checked_at, notes
                    "#,
                )
                .bind(identifier)
                .bind(STATUS_AVAILABLE)
                .bind(now)
                .bind(now)
                .bind(notes)
                .fetch_one(&pool)
                .await
            })
            .await?;

        Ok(row.into())
    }

    async fn exists(&self, identifier: &str) -> Result<bool, AppError> {
        let row = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM available_usernames WHERE username = ? LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.is_some())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM available_usernames")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    async fn list(&self, limit: Option<i64>) -> Result<Vec<AvailableRecord>, AppError> {
        // SQLite treats a negative LIMIT as "no limit".
        let rows = sqlx::query_as::<_, AvailableRow>(
            r#"
            SELECT id, username, status, created_at, checked_at, notes
            FROM available_usernames
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(AvailableRecord::from).collect())
    }

    async fn delete(&self, identifier: &str) -> Result<bool, AppError> {
        let result = self
            .db
            .write(move |pool| async move {
                sqlx::query("DELETE FROM available_usernames WHERE username = ?")
                    .bind(identifier)
                    .execute(&pool)
                    .await
            })
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<(u64, u64), AppError> {
        self.db
            .write(|pool| async move {
                let mut tx = pool.begin().await?;
                let ledger = sqlx::query("DELETE FROM available_usernames")
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                let history = sqlx::query("DELETE FROM check_history")
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();
                tx.commit().await?;
                Ok::<_, sqlx::Error>((ledger, history))
            })
            .await
    }
}
