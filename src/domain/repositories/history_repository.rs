//! Repository trait for the probe audit log.

use crate::domain::entities::{HistoryEntry, NewHistoryEntry};
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only audit log of probe attempts.
///
/// A username may appear any number of times.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn append(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, AppError>;

    /// Counts every recorded attempt.
    async fn count(&self) -> Result<i64, AppError>;

    /// Counts attempts that classified the username as available.
    async fn count_available(&self) -> Result<i64, AppError>;

    /// Lists the most recent attempts for one username, newest first.
    async fn list_for(&self, identifier: &str, limit: i64) -> Result<Vec<HistoryEntry>, AppError>;
}
