//! Payment confirmation
//!
//! Fetches a finalized transaction with bounded retries and checks it
//! against the payment the caller claims to have made. A transaction is
//! accepted only if its fee payer (first signer) is the claimed address and
//! at least one System transfer moves exactly the expected lamports from
//! that address to the funds-collection address.

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::system_program;
use solana_sdk::transaction::VersionedTransaction;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::constants::{CONFIRM_MAX_ATTEMPTS, CONFIRM_RETRY_DELAY_MS};
use crate::error::{ChainError, Result};
use crate::ledger::LedgerApi;

/// Discriminant of `SystemInstruction::Transfer` in instruction data.
const SYSTEM_TRANSFER_INDEX: u32 = 2;

#[derive(Debug, Clone)]
pub struct PaymentCheck {
    pub payer: Pubkey,
    pub funds_address: Pubkey,
    pub expected_lamports: u64,
}

/// Decode a compiled instruction as a System transfer, if it is one.
fn decode_system_transfer(
    tx: &VersionedTransaction,
    ix_index: usize,
) -> Option<(Pubkey, Pubkey, u64)> {
    let keys = tx.message.static_account_keys();
    let ix = &tx.message.instructions()[ix_index];
    if *keys.get(ix.program_id_index as usize)? != system_program::id() {
        return None;
    }
    if ix.data.len() != 12 {
        return None;
    }
    let discriminant = u32::from_le_bytes(ix.data[0..4].try_into().ok()?);
    if discriminant != SYSTEM_TRANSFER_INDEX {
        return None;
    }
    let lamports = u64::from_le_bytes(ix.data[4..12].try_into().ok()?);
    let from = *keys.get(*ix.accounts.first()? as usize)?;
    let to = *keys.get(*ix.accounts.get(1)? as usize)?;
    Some((from, to, lamports))
}

fn validate_payment(tx: &VersionedTransaction, check: &PaymentCheck) -> Result<()> {
    let fee_payer = tx
        .message
        .static_account_keys()
        .first()
        .ok_or_else(|| ChainError::PaymentMismatch("transaction has no accounts".to_string()))?;
    if *fee_payer != check.payer {
        return Err(ChainError::PaymentMismatch(format!(
            "fee payer {} does not match claimed address {}",
            fee_payer, check.payer
        )));
    }

    let paid = (0..tx.message.instructions().len())
        .filter_map(|i| decode_system_transfer(tx, i))
        .any(|(from, to, lamports)| {
            from == check.payer && to == check.funds_address && lamports == check.expected_lamports
        });
    if !paid {
        return Err(ChainError::PaymentMismatch(format!(
            "no transfer of {} lamports from {} to {}",
            check.expected_lamports, check.payer, check.funds_address
        )));
    }
    Ok(())
}

/// Verify the claimed payment with the default retry policy.
pub async fn verify_payment(
    ledger: &dyn LedgerApi,
    signature: &Signature,
    check: &PaymentCheck,
) -> Result<()> {
    verify_payment_with_policy(
        ledger,
        signature,
        check,
        CONFIRM_MAX_ATTEMPTS,
        CONFIRM_RETRY_DELAY_MS,
    )
    .await
}

/// Verify with an explicit retry policy. Gives up with `PaymentNotFound`
/// after the attempts are exhausted rather than blocking indefinitely.
pub async fn verify_payment_with_policy(
    ledger: &dyn LedgerApi,
    signature: &Signature,
    check: &PaymentCheck,
    max_attempts: u32,
    retry_delay_ms: u64,
) -> Result<()> {
    for attempt in 1..=max_attempts {
        if let Some(tx) = ledger.fetch_transaction(signature).await? {
            debug!(
                "Transaction {} found on attempt {}/{}",
                signature, attempt, max_attempts
            );
            return validate_payment(&tx, check);
        }
        if attempt < max_attempts {
            sleep(Duration::from_millis(retry_delay_ms)).await;
        }
    }
    Err(ChainError::PaymentNotFound(signature.to_string()))
}
