//! Audit log entry, one per probe attempt.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A recorded probe attempt.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub identifier: String,
    /// True only when the probe classified the username as available.
    pub available: bool,
    /// `available`, `taken` or `unknown`.
    pub outcome: String,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn availability(&self) -> Option<bool> {
        match self.outcome.as_str() {
            "available" => Some(true),
            "taken" => Some(false),
            _ => None,
        }
    }
}

/// Input data for appending to the audit log.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub identifier: String,
    /// `None` when the probe was indeterminate.
    pub availability: Option<bool>,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
}

impl NewHistoryEntry {
    pub fn outcome(&self) -> &'static str {
        match self.availability {
            Some(true) => "available",
            Some(false) => "taken",
            None => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(availability: Option<bool>) -> NewHistoryEntry {
        NewHistoryEntry {
            identifier: "ab12".to_string(),
            availability,
            status_code: None,
            error_message: None,
        }
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(entry(Some(true)).outcome(), "available");
        assert_eq!(entry(Some(false)).outcome(), "taken");
        assert_eq!(entry(None).outcome(), "unknown");
    }

    #[test]
    fn test_entry_availability_from_outcome() {
        let stored = HistoryEntry {
            id: 1,
            identifier: "ab12".to_string(),
            available: false,
            outcome: "unknown".to_string(),
            status_code: Some(500),
            error_message: Some("unexpected_status".to_string()),
            checked_at: Utc::now(),
        };
        assert_eq!(stored.availability(), None);
    }
}
