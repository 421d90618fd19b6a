//! Ownership reconciliation
//!
//! The store's `purchased` flag is derived from chain truth, never from
//! client claims: an unpurchased brick whose asset has left the service
//! wallet was sold, whoever now holds it. The reconciler re-derives the
//! flag on a fixed interval for the service's lifetime; a failed cycle is
//! logged and skipped, never fatal.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sea_orm::DatabaseConnection;
use solana::das::DasApi;
use solana::fetch_owned_assets;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, error, info, warn};

use crate::state::SharedState;

pub struct Reconciler {
    db: DatabaseConnection,
    das: Arc<dyn DasApi>,
    service_address: Pubkey,
    state: SharedState,
    interval_secs: u64,
}

impl Reconciler {
    pub fn new(
        db: DatabaseConnection,
        das: Arc<dyn DasApi>,
        service_address: Pubkey,
        state: SharedState,
        interval_secs: u64,
    ) -> Self {
        Self {
            db,
            das,
            service_address,
            state,
            interval_secs,
        }
    }

    /// Run until shutdown, one cycle per interval.
    pub async fn run(&self) {
        info!(
            "🔍 Starting ownership reconciler (cycle every {} seconds)",
            self.interval_secs
        );

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        interval.tick().await; // Skip the first immediate tick

        loop {
            if self.state.is_shutting_down() {
                info!("Reconciler shutting down...");
                break;
            }

            interval.tick().await;

            if self.state.is_shutting_down() {
                break;
            }

            match self.run_cycle().await {
                Ok(updated) if updated > 0 => {
                    info!("Reconciliation cycle marked {} bricks purchased", updated);
                }
                Ok(_) => debug!("Reconciliation cycle found nothing to update"),
                Err(e) => {
                    error!("Reconciliation cycle failed: {}; will retry next cycle", e);
                }
            }
        }
    }

    /// One reconciliation pass. Returns the number of bricks marked
    /// purchased. Public so tests run exactly one deterministic cycle.
    pub async fn run_cycle(&self) -> Result<u64> {
        let owned = fetch_owned_assets(self.das.as_ref(), &self.service_address).await;
        let owned_ids: HashSet<&str> = owned.iter().map(|a| a.id.as_str()).collect();

        let unpurchased = db::store::unpurchased_bricks(&self.db).await?;
        if unpurchased.is_empty() {
            return Ok(0);
        }

        // An empty listing with unsold inventory outstanding is far more
        // likely an indexer outage than a simultaneous sale of everything;
        // skip the cycle instead of flipping the whole wall.
        if owned_ids.is_empty() {
            warn!(
                "Service wallet listing came back empty with {} unpurchased bricks; skipping cycle",
                unpurchased.len()
            );
            return Ok(0);
        }

        let sold: Vec<String> = unpurchased
            .iter()
            .filter(|brick| !owned_ids.contains(brick.asset_id.as_str()))
            .map(|brick| brick.asset_id.clone())
            .collect();

        debug!(
            "Reconciliation: {} unpurchased bricks, {} owned assets, {} to mark sold",
            unpurchased.len(),
            owned_ids.len(),
            sold.len()
        );

        if sold.is_empty() {
            return Ok(0);
        }

        let updated = db::store::mark_purchased_by_assets(&self.db, &sold).await?;
        if updated > 0 {
            self.state.invalidate_render().await;
        }
        Ok(updated)
    }
}
