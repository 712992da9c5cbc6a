//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access; concrete implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`AvailableRepository`] - Dedup ledger of available usernames
//! - [`HistoryRepository`] - Append-only probe audit log
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod available_repository;
pub mod history_repository;

pub use available_repository::AvailableRepository;
pub use history_repository::HistoryRepository;

#[cfg(test)]
pub use available_repository::MockAvailableRepository;
#[cfg(test)]
pub use history_repository::MockHistoryRepository;
