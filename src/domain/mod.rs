//! Domain layer containing entities and the contracts the other layers meet.
//!
//! # Architecture
//!
//! - [`entities`] - Probe results, ledger records, audit entries
//! - [`repositories`] - Data access trait definitions
//! - [`probing`] - Strategy and probe traits
//!
//! # Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Traits define contracts implemented by the infrastructure layer
//! - Orchestration lives in services (see [`crate::application::services`])
//!
//! # Probe Flow
//!
//! 1. The CLI asks the generator for a batch of candidates
//! 2. [`crate::application::services::BatchOrchestrator`] schedules probes in windows
//! 3. [`crate::application::services::Prober`] walks its [`probing::ProbeStrategy`] chain
//! 4. Results go to [`crate::application::services::LedgerService`]

pub mod entities;
pub mod probing;
pub mod repositories;
