//! Ledger record for a username found available.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status written for every ledger row created by a probe run.
pub const STATUS_AVAILABLE: &str = "available";

/// A username recorded as available. At most one row per username.
#[derive(Debug, Clone, Serialize)]
pub struct AvailableRecord {
    pub id: i64,
    pub identifier: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub checked_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Input data for a new ledger row.
#[derive(Debug, Clone)]
pub struct NewAvailableRecord {
    pub identifier: String,
    pub notes: Option<String>,
}

impl NewAvailableRecord {
    pub fn new(identifier: impl Into<String>, notes: Option<String>) -> Self {
        Self {
            identifier: identifier.into(),
            notes,
        }
    }
}

/// Result of a single ledger insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertOutcome {
    /// False when the username was already in the ledger.
    pub inserted: bool,
}

/// Aggregate result of inserting many usernames.
///
/// `added + duplicates == total` always holds. Inserts that failed for a
/// storage reason count as not added and are listed in `failures`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddManySummary {
    pub added: usize,
    pub duplicates: usize,
    pub total: usize,
    pub failures: Vec<String>,
}
