//! Business logic services for the application layer.

pub mod batch_service;
pub mod ledger_service;
pub mod probe_service;

pub use batch_service::{BatchOrchestrator, BatchReport, BatchSettings};
pub use ledger_service::LedgerService;
pub use probe_service::Prober;
