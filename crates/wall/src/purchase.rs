//! Purchase batch assembly
//!
//! Validates the requested bricks against the store, then produces one
//! serialized transaction per brick the purchaser does not already own.
//! All transactions in a batch share the blockhash fetched once at the
//! start of the request, so the batch is internally consistent however the
//! caller submits it.

use std::str::FromStr;

use sea_orm::DatabaseConnection;
use solana::assemble::{build_purchase_transaction, PurchaseParams};
use solana::constants::PURCHASE_CHUNK_SIZE;
use solana::proof::{resolve_transfer, TransferResolution};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use crate::config::Config;
use crate::context::ChainContext;
use crate::error::WallError;

#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub purchaser: String,
    pub bricks: Vec<(i32, i32)>,
}

/// Assemble the purchase batch for the requested bricks.
///
/// Fails fast with `UnknownBricks` before touching the network if any
/// coordinate has no catalog row. Bricks the purchaser already owns, and
/// bricks owned by a third party (a concurrent purchase won the race), are
/// absent from the output; everything else fails the whole batch.
pub async fn assemble_purchase_batch(
    db: &DatabaseConnection,
    chain: &ChainContext,
    config: &Config,
    request: &PurchaseRequest,
) -> Result<Vec<String>, WallError> {
    let purchaser = Pubkey::from_str(&request.purchaser)
        .map_err(|_| WallError::InvalidAddress(request.purchaser.clone()))?;

    let (bricks, missing) = db::store::find_bricks(db, &request.bricks)
        .await
        .map_err(WallError::from_store)?;
    if !missing.is_empty() {
        return Err(WallError::UnknownBricks { missing });
    }

    let blockhash = chain.ledger.latest_blockhash().await?;
    let service_address = chain.service_address();
    let params = PurchaseParams {
        purchaser,
        funds_address: config.funds_address,
        price_lamports: config.brick_price_lamports,
        service_fee_lamports: config.service_fee_lamports,
        tip_lamports: config.tip_lamports,
        compute_unit_limit: config.compute_unit_limit,
        compute_unit_price_micro_lamports: config.compute_unit_price_micro_lamports,
        blockhash,
    };

    info!(
        "Assembling purchase batch: {} bricks for {}",
        bricks.len(),
        purchaser
    );

    let mut transactions = Vec::with_capacity(bricks.len());
    for chunk in bricks.chunks(PURCHASE_CHUNK_SIZE) {
        let builds = chunk.iter().map(|brick| {
            let params = &params;
            let chain = &chain;
            let service_address = &service_address;
            async move {
                let resolution = resolve_transfer(
                    chain.das.as_ref(),
                    chain.ledger.as_ref(),
                    &brick.asset_id,
                    service_address,
                    &params.purchaser,
                )
                .await?;

                match resolution {
                    TransferResolution::NoTransferNeeded => {
                        debug!(
                            "Brick ({}, {}) already owned by purchaser; skipping",
                            brick.x, brick.y
                        );
                        Ok::<Option<String>, WallError>(None)
                    }
                    TransferResolution::OwnershipConflict { current_owner } => {
                        info!(
                            "Brick ({}, {}) owned by {}; excluding from batch",
                            brick.x, brick.y, current_owner
                        );
                        Ok(None)
                    }
                    TransferResolution::Plan(plan) => {
                        let encoded =
                            build_purchase_transaction(params, chain.service.as_ref(), Some(&plan))?;
                        Ok(Some(encoded))
                    }
                }
            }
        });

        let chunk_results = futures::future::try_join_all(builds).await?;
        transactions.extend(chunk_results.into_iter().flatten());
    }

    info!(
        "Purchase batch assembled: {} transactions for {} requested bricks",
        transactions.len(),
        bricks.len()
    );
    Ok(transactions)
}
