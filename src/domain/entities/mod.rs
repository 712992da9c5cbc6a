//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`ProbeResult`] - Classified outcome of one probe
//! - [`AvailableRecord`] - A username kept in the dedup ledger
//! - [`HistoryEntry`] - One row of the probe audit log
//! - [`StatisticsSnapshot`] - Counters derived from the two tables
//!
//! Creation inputs use separate structs (`NewAvailableRecord`,
//! `NewHistoryEntry`), following the same pattern across entities.

pub mod available;
pub mod history;
pub mod probe;

pub use available::{AddManySummary, AvailableRecord, InsertOutcome, NewAvailableRecord};
pub use history::{HistoryEntry, NewHistoryEntry};
pub use probe::{Availability, ProbeResult, StrategyKind, UnknownKind};

use serde::Serialize;

/// Ledger counters, computed on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatisticsSnapshot {
    pub total_available: i64,
    pub total_checks: i64,
    pub available_from_history: i64,
}
