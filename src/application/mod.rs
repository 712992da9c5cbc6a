//! Application layer: probing, batching and the ledger.
//!
//! Services take their collaborators as trait objects or generic parameters
//! and are wired together in [`crate::runtime::bootstrap`].
//!
//! # Available Services
//!
//! - [`services::Prober`] - Strategy chain for a single username
//! - [`services::BatchOrchestrator`] - Windowed, paced probing of many usernames
//! - [`services::LedgerService`] - Dedup ledger and audit log

pub mod backoff;
pub mod services;
