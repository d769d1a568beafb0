//! Service entry point: load config, wire the store, verify readiness.
//!
//! The HTTP API binds in a separate service; this binary owns the core
//! wiring and doubles as a readiness probe for the database.

use corebank::config::AppConfig;
use corebank::db::Database;
use corebank::logging::init_logging;
use corebank::store::PgLedgerStore;
use corebank::transfer::TransferOrchestrator;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::args().nth(1).unwrap_or_else(|| "dev".to_string());
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    info!(env = %env, "starting corebank");

    let db = Database::connect(&config.database).await?;
    db.health_check().await?;

    let store = Arc::new(PgLedgerStore::new(db.pool().clone()));
    let _orchestrator = TransferOrchestrator::new(store);

    info!("corebank ready");
    Ok(())
}
