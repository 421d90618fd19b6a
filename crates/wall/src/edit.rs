//! Paid edit flow
//!
//! Editing an already-filled brick costs `edit_price × brick_count`, paid
//! in one aggregated transaction. The caller first asks for the payment
//! transaction, signs and submits it externally, then confirms it here
//! with the signature; a confirmed payment re-opens the image slot for
//! every target brick. Each on-chain transaction authorizes at most one
//! edit.

use std::str::FromStr;

use sea_orm::DatabaseConnection;
use solana::assemble::build_edit_payment_transaction;
use solana::confirm::{verify_payment_with_policy, PaymentCheck};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::info;

use crate::config::Config;
use crate::context::ChainContext;
use crate::error::WallError;
use crate::state::SharedState;

#[derive(Debug, Clone)]
pub struct EditPaymentRequest {
    pub payer: String,
    pub bricks: Vec<(i32, i32)>,
}

#[derive(Debug, Clone)]
pub struct EditConfirmation {
    pub username: String,
    pub address: String,
    pub signature: String,
    pub bricks: Vec<(i32, i32)>,
}

/// Validate that every target brick is purchased and already carries image
/// content, partitioning the offenders for an itemized error.
async fn require_editable(
    db: &DatabaseConnection,
    coords: &[(i32, i32)],
) -> Result<(), WallError> {
    let (bricks, missing) = db::store::find_bricks(db, coords)
        .await
        .map_err(WallError::from_store)?;
    if !missing.is_empty() {
        return Err(WallError::UnknownBricks { missing });
    }

    let not_purchased: Vec<(i32, i32)> = bricks
        .iter()
        .filter(|b| !b.purchased)
        .map(|b| (b.x, b.y))
        .collect();
    let missing_image: Vec<(i32, i32)> = bricks
        .iter()
        .filter(|b| b.image_location.as_deref().unwrap_or("").is_empty())
        .map(|b| (b.x, b.y))
        .collect();

    if !not_purchased.is_empty() || !missing_image.is_empty() {
        return Err(WallError::NotEditable {
            not_purchased,
            missing_image,
        });
    }
    Ok(())
}

/// Build the single aggregated edit-payment transaction.
pub async fn assemble_edit_payment(
    db: &DatabaseConnection,
    chain: &ChainContext,
    config: &Config,
    request: &EditPaymentRequest,
) -> Result<String, WallError> {
    let payer = Pubkey::from_str(&request.payer)
        .map_err(|_| WallError::InvalidAddress(request.payer.clone()))?;

    require_editable(db, &request.bricks).await?;

    let total = config.edit_price_lamports * request.bricks.len() as u64;
    let blockhash = chain.ledger.latest_blockhash().await?;
    let encoded = build_edit_payment_transaction(
        &payer,
        &config.funds_address,
        total,
        config.tip_lamports,
        config.compute_unit_limit,
        config.compute_unit_price_micro_lamports,
        blockhash,
    )?;

    info!(
        "Edit payment assembled for {}: {} bricks, {} lamports",
        payer,
        request.bricks.len(),
        total
    );
    Ok(encoded)
}

/// Confirm a submitted edit payment and consume its transaction hash.
///
/// The replay check runs before any network call; the signature is only
/// accepted once, however many times it is resubmitted.
pub async fn confirm_edit(
    db: &DatabaseConnection,
    chain: &ChainContext,
    state: &SharedState,
    config: &Config,
    request: &EditConfirmation,
) -> Result<(), WallError> {
    let payer = Pubkey::from_str(&request.address)
        .map_err(|_| WallError::InvalidAddress(request.address.clone()))?;
    let signature = Signature::from_str(&request.signature)
        .map_err(|_| WallError::InvalidSignature(request.signature.clone()))?;

    if db::store::edit_exists(db, &request.signature)
        .await
        .map_err(WallError::from_store)?
    {
        return Err(WallError::EditAlreadyConsumed {
            tx_hash: request.signature.clone(),
        });
    }

    require_editable(db, &request.bricks).await?;

    let check = PaymentCheck {
        payer,
        funds_address: config.funds_address,
        expected_lamports: config.edit_price_lamports * request.bricks.len() as u64,
    };
    verify_payment_with_policy(
        chain.ledger.as_ref(),
        &signature,
        &check,
        config.confirm_max_attempts,
        config.confirm_retry_delay_ms,
    )
    .await?;

    db::store::record_edit(db, &request.username, &request.signature)
        .await
        .map_err(WallError::from_store)?;
    db::store::clear_image_locations(db, &request.bricks)
        .await
        .map_err(WallError::from_store)?;
    state.invalidate_render().await;

    info!(
        "Edit confirmed for {}: {} bricks re-opened (tx {})",
        request.username,
        request.bricks.len(),
        request.signature
    );
    Ok(())
}
