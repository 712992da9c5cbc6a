//! Ledger of available usernames plus the probe audit log.

use std::sync::Arc;

use crate::domain::entities::{
    AddManySummary, AvailableRecord, HistoryEntry, InsertOutcome, NewAvailableRecord,
    NewHistoryEntry, ProbeResult, StatisticsSnapshot,
};
use crate::domain::repositories::{AvailableRepository, HistoryRepository};
use crate::error::AppError;

/// Service over the two persisted tables.
///
/// The ledger keeps at most one row per username; duplicates are reported
/// as `inserted = false` rather than as errors. The audit log is append-only
/// and best effort: failures to record history are logged and swallowed.
pub struct LedgerService<A: AvailableRepository, H: HistoryRepository> {
    available_repository: Arc<A>,
    history_repository: Arc<H>,
}

impl<A: AvailableRepository, H: HistoryRepository> LedgerService<A, H> {
    pub fn new(available_repository: Arc<A>, history_repository: Arc<H>) -> Self {
        Self {
            available_repository,
            history_repository,
        }
    }

    /// Inserts `identifier` into the ledger if it is not already there.
    ///
    /// Duplicates are detected by the unique constraint, not by a lookup.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the write fails for any reason other
    /// than a duplicate.
    pub async fn add_available(
        &self,
        identifier: &str,
        notes: Option<String>,
    ) -> Result<InsertOutcome, AppError> {
        match self
            .available_repository
            .create(NewAvailableRecord::new(identifier, notes))
            .await
        {
            Ok(_) => Ok(InsertOutcome { inserted: true }),
            Err(e) if e.is_conflict() => Ok(InsertOutcome { inserted: false }),
            Err(e) => Err(e),
        }
    }

    /// Inserts every identifier, counting new rows and duplicates.
    ///
    /// Repeats inside `identifiers` count as duplicates. A write that fails
    /// outright is counted under `duplicates` and its error is listed in
    /// `failures`, so `added + duplicates == total` always holds.
    pub async fn add_many(&self, identifiers: &[String]) -> AddManySummary {
        let mut summary = AddManySummary {
            total: identifiers.len(),
            ..Default::default()
        };

        for identifier in identifiers {
            match self.add_available(identifier, None).await {
                Ok(InsertOutcome { inserted: true }) => summary.added += 1,
                Ok(InsertOutcome { inserted: false }) => summary.duplicates += 1,
                Err(e) => {
                    tracing::error!(username = %identifier, error = %e, "Failed to store available username");
                    summary.duplicates += 1;
                    summary.failures.push(format!("{identifier}: {e}"));
                }
            }
        }

        tracing::info!(
            added = summary.added,
            duplicates = summary.duplicates,
            total = summary.total,
            failed = summary.failures.len(),
            "Stored available usernames"
        );

        summary
    }

    /// Appends one audit entry. Never fails.
    pub async fn record_history(
        &self,
        identifier: &str,
        availability: Option<bool>,
        status_code: Option<u16>,
        error_message: Option<String>,
    ) {
        let entry = NewHistoryEntry {
            identifier: identifier.to_string(),
            availability,
            status_code,
            error_message,
        };

        if let Err(e) = self.history_repository.append(entry).await {
            tracing::warn!(username = identifier, error = %e, "Failed to record check history");
        }
    }

    /// Appends one audit entry per probe result.
    pub async fn record_results(&self, results: &[ProbeResult]) {
        for result in results {
            self.record_history(
                &result.identifier,
                result.availability.as_bool(),
                result.raw_status_code,
                result.error_message(),
            )
            .await;
        }
    }

    pub async fn exists(&self, identifier: &str) -> Result<bool, AppError> {
        self.available_repository.exists(identifier).await
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        self.available_repository.count().await
    }

    /// Every ledger row, newest first.
    pub async fn list_all(&self) -> Result<Vec<AvailableRecord>, AppError> {
        self.available_repository.list(None).await
    }

    /// At most `limit` ledger rows, newest first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<AvailableRecord>, AppError> {
        self.available_repository.list(Some(limit.max(0))).await
    }

    pub async fn delete(&self, identifier: &str) -> Result<bool, AppError> {
        self.available_repository.delete(identifier).await
    }

    /// Empties the ledger and the audit log atomically.
    ///
    /// Returns the number of ledger rows removed.
    pub async fn clear(&self) -> Result<u64, AppError> {
        let (removed, history) = self.available_repository.clear().await?;
        tracing::info!(ledger = removed, history, "Cleared ledger and history");
        Ok(removed)
    }

    pub async fn statistics(&self) -> Result<StatisticsSnapshot, AppError> {
        Ok(StatisticsSnapshot {
            total_available: self.available_repository.count().await?,
            total_checks: self.history_repository.count().await?,
            available_from_history: self.history_repository.count_available().await?,
        })
    }

    /// Most recent audit entries for one username.
    pub async fn history_for(
        &self,
        identifier: &str,
        limit: i64,
    ) -> Result<Vec<HistoryEntry>, AppError> {
        self.history_repository.list_for(identifier, limit.max(0)).await
    }
}
