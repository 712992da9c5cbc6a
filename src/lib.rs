//! # Username Scout
//!
//! Finds short, unclaimed usernames on a remote social platform and keeps a
//! deduplicated SQLite ledger of the available ones.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Probe results, ledger entities, repository and strategy traits
//! - **Application Layer** ([`application`]) - Prober, batch orchestration and the ledger service
//! - **Infrastructure Layer** ([`infrastructure`]) - SQLite repositories and HTTP strategies
//!
//! ## Features
//!
//! - Random 4-character candidates from a 37-symbol alphabet
//! - Two-strategy probing: authenticated lookup with fallback to a public page check
//! - Tri-state results (available / taken / unknown with a reason)
//! - Windowed concurrency with jittered pacing and adaptive backoff
//! - Append-only audit log of every probe
//!
//! ## Quick Start
//!
//! ```bash
//! export DATABASE_URL="sqlite://usernames.db"
//! export PLATFORM_SESSION_ID="..."   # optional
//!
//! cargo run -- scan --count 20
//! cargo run -- stats
//! ```
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod runtime;
pub mod state;
pub mod utils;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        BatchOrchestrator, BatchReport, BatchSettings, LedgerService, Prober,
    };
    pub use crate::domain::entities::{
        AddManySummary, Availability, ProbeResult, StatisticsSnapshot, StrategyKind, UnknownKind,
    };
    pub use crate::domain::probing::{Probe, ProbeStrategy, StrategyOutcome};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
    pub use crate::utils::username_generator::{generate_batch, validate_identifier};
}
