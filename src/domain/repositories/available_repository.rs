//! Repository trait for the available-username ledger.

use crate::domain::entities::{AvailableRecord, NewAvailableRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the dedup ledger.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqliteAvailableRepository`] - SQLite implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_available.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailableRepository: Send + Sync {
    /// Inserts a new ledger row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username is already recorded.
    /// The unique constraint decides; there is no pre-check.
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, record: NewAvailableRecord) -> Result<AvailableRecord, AppError>;

    /// Returns true if the username is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn exists(&self, identifier: &str) -> Result<bool, AppError>;

    /// Counts ledger rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Lists ledger rows, newest first.
    ///
    /// `limit = None` returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, limit: Option<i64>) -> Result<Vec<AvailableRecord>, AppError>;

    /// Deletes one row. Returns `Ok(true)` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, identifier: &str) -> Result<bool, AppError>;

    /// Deletes every ledger row together with the whole audit log, in one
    /// transaction.
    ///
    /// Returns `(ledger_rows, history_rows)` removed. On error neither table
    /// is touched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn clear(&self) -> Result<(u64, u64), AppError>;
}
