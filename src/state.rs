use std::sync::Arc;

use crate::application::services::{BatchOrchestrator, LedgerService, Prober};
use crate::config::Config;
use crate::infrastructure::persistence::{
    Database, SqliteAvailableRepository, SqliteHistoryRepository,
};

pub type SqliteLedger = LedgerService<SqliteAvailableRepository, SqliteHistoryRepository>;

/// Everything a command needs, built once by [`crate::runtime::bootstrap`].
pub struct AppState {
    pub config: Config,
    pub db: Arc<Database>,
    pub orchestrator: BatchOrchestrator<Prober>,
    pub ledger: SqliteLedger,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<Database>,
        orchestrator: BatchOrchestrator<Prober>,
        ledger: SqliteLedger,
    ) -> Self {
        Self {
            config,
            db,
            orchestrator,
            ledger,
        }
    }
}
