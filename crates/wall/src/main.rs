use std::sync::Arc;

use anyhow::Result;
use sea_orm::Database;
use solana::DasClient;
use solana_sdk::signer::Signer;
use tracing::{info, warn};

use wall::config::Config;
use wall::logging::init_logging;
use wall::reconcile::Reconciler;
use wall::state::SharedState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging()?;

    let config = Config::from_env()?;
    info!("Starting wall service (rpc: {})", config.rpc_url);

    let db = Database::connect(&config.database_url).await?;
    info!("Connected to database");

    let entries = db::catalog::load_catalog(&config.catalog_path).await?;
    let seeded = db::catalog::seed_catalog(&db, &entries).await?;
    if seeded > 0 {
        info!("Seeded {} bricks from catalog", seeded);
    }

    let service = Arc::new(solana::load_service_keypair()?);
    info!("Service identity: {}", service.pubkey());

    let das = Arc::new(DasClient::new(config.das_url.clone()));

    let state = SharedState::new();
    let reconciler = Reconciler::new(
        db.clone(),
        das,
        service.pubkey(),
        state.clone(),
        config.reconcile_interval_secs,
    );
    let reconciler_handle = tokio::spawn(async move { reconciler.run().await });

    tokio::signal::ctrl_c().await?;
    warn!("⚠️  Received SIGINT, shutting down...");
    state.set_shutdown();
    reconciler_handle.abort();

    Ok(())
}
