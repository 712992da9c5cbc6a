//! SQLite repository implementations.
//!
//! Queries are bound at runtime through SQLx; the schema lives in
//! `migrations/` and is embedded into the binary.
//!
//! # Repositories
//!
//! - [`SqliteAvailableRepository`] - Dedup ledger of available usernames
//! - [`SqliteHistoryRepository`] - Probe audit log
//!
//! Both share one [`Database`], which serializes writes.

pub mod database;
pub mod sqlite_available_repository;
pub mod sqlite_history_repository;

pub use database::Database;
pub use sqlite_available_repository::SqliteAvailableRepository;
pub use sqlite_history_repository::SqliteHistoryRepository;
