//! Library-wide error type.
//!
//! Probe failures never use this type: they are folded into
//! [`crate::domain::entities::ProbeResult`]. `AppError` covers validation of
//! operator input, storage failures and misconfiguration.

use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable code, used in logs and `--json` output.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Conflict { details, .. }
            | AppError::Internal { details, .. } => details,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict { .. })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::internal("Migration failed", json!({ "reason": e.to_string() }))
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
    }

    AppError::internal("Database error", json!({ "reason": e.to_string() }))
}

/// Returns true for SQLite "database is busy/locked" errors, which are worth retrying.
pub fn is_busy_error(e: &sqlx::Error) -> bool {
    match e.as_database_error().and_then(|db| db.code()) {
        // SQLITE_BUSY (5) and SQLITE_LOCKED (6), including extended codes.
        Some(code) => code
            .parse::<i32>()
            .map(|c| matches!(c & 0xff, 5 | 6))
            .unwrap_or(false),
        None => matches!(e, sqlx::Error::PoolTimedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_message() {
        let err = AppError::bad_request("Count must be at least 1", json!({ "count": 0 }));
        assert_eq!(err.to_string(), "Count must be at least 1");
        assert_eq!(err.code(), "validation_error");
        assert_eq!(err.details()["count"], 0);
    }

    #[test]
    fn test_is_conflict() {
        assert!(AppError::conflict("dup", json!({})).is_conflict());
        assert!(!AppError::internal("boom", json!({})).is_conflict());
    }

    #[test]
    fn test_non_database_error_maps_to_internal() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[test]
    fn test_pool_timeout_is_busy() {
        assert!(is_busy_error(&sqlx::Error::PoolTimedOut));
        assert!(!is_busy_error(&sqlx::Error::RowNotFound));
    }
}
