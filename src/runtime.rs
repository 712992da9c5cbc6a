//! Service wiring.
//!
//! Builds the database, the strategy chain and the services from a
//! [`Config`]. Nothing here is global: callers own the returned [`AppState`].

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::services::{BatchOrchestrator, LedgerService, Prober};
use crate::config::Config;
use crate::infrastructure::persistence::{
    Database, SqliteAvailableRepository, SqliteHistoryRepository,
};
use crate::infrastructure::remote::build_strategies;
use crate::state::AppState;

/// Connects to the database, applies migrations and builds every service.
///
/// # Errors
///
/// Returns an error if:
/// - the database cannot be opened or migrated
/// - the platform URLs are invalid
/// - an HTTP client cannot be built
pub async fn bootstrap(config: Config) -> Result<AppState> {
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    db.migrate().await.context("Failed to migrate")?;

    bootstrap_with(config, Arc::new(db))
}

/// Builds every service on top of an already migrated database.
///
/// # Errors
///
/// See [`bootstrap`].
pub fn bootstrap_with(config: Config, db: Arc<Database>) -> Result<AppState> {
    let probe_settings = config.probe_settings()?;
    let strategies = build_strategies(&probe_settings).context("Failed to build probe strategies")?;

    let mut prober = Prober::new(strategies).context("Failed to build prober")?;
    if let Some(rps) = probe_settings.max_requests_per_second {
        tracing::info!(rps = rps.get(), "Probe pacing enabled");
        prober = prober.with_rate_limit(rps);
    }
    tracing::info!(strategies = ?prober.strategy_kinds(), "Prober ready");

    let orchestrator = BatchOrchestrator::new(Arc::new(prober), config.batch_settings());

    let ledger = LedgerService::new(
        Arc::new(SqliteAvailableRepository::new(Arc::clone(&db))),
        Arc::new(SqliteHistoryRepository::new(Arc::clone(&db))),
    );

    Ok(AppState::new(config, db, orchestrator, ledger))
}
