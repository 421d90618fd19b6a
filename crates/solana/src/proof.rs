//! Merkle proof resolution for compressed-asset transfers
//!
//! Turns an asset id plus the intended new owner into everything the
//! transfer instruction needs: the proof path trimmed to the part the
//! on-chain canopy does not cover, the tree authority, and the current leaf
//! metadata. The skip / conflict / fail trichotomy is deliberate: a
//! transfer to the current owner is a no-op, a leaf owned by a third party
//! is a conflict the assembler drops from its batch, and everything else is
//! a hard error.

use std::str::FromStr;

use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info};

use crate::constants::BUBBLEGUM_PROGRAM_ID;
use crate::das::DasApi;
use crate::error::{ChainError, Result};
use crate::ledger::LedgerApi;
use crate::tree;

/// Everything needed to append a transfer instruction for one leaf.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    pub tree: Pubkey,
    pub tree_authority: Pubkey,
    pub leaf_owner: Pubkey,
    pub leaf_delegate: Pubkey,
    pub new_leaf_owner: Pubkey,
    pub root: [u8; 32],
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
    pub leaf_id: u64,
    /// Uncached suffix of the proof path, as read-only non-signer accounts.
    pub proof: Vec<AccountMeta>,
}

#[derive(Debug, Clone)]
pub enum TransferResolution {
    /// The target address already owns the leaf.
    NoTransferNeeded,
    /// The leaf is owned by neither the expected owner nor the target.
    OwnershipConflict { current_owner: Pubkey },
    Plan(TransferPlan),
}

fn decode_pubkey(field: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|e| ChainError::Decode {
        field: field.to_string(),
        message: format!("{value}: {e}"),
    })
}

fn decode_hash32(field: &str, value: &str) -> Result<[u8; 32]> {
    let bytes = bs58::decode(value)
        .into_vec()
        .map_err(|e| ChainError::Decode {
            field: field.to_string(),
            message: format!("{value}: {e}"),
        })?;
    bytes.try_into().map_err(|_| ChainError::Decode {
        field: field.to_string(),
        message: format!("{value}: not 32 bytes"),
    })
}

/// Resolve the transfer of `asset_id` to `new_owner`.
///
/// `expected_owner` is the address the caller believes currently holds the
/// leaf (the service identity in the purchase flow); a mismatch against the
/// indexer's authoritative owner is reported as a conflict, distinct from
/// the idempotent short-circuit when `new_owner` already holds it.
pub async fn resolve_transfer(
    das: &dyn DasApi,
    ledger: &dyn LedgerApi,
    asset_id: &str,
    expected_owner: &Pubkey,
    new_owner: &Pubkey,
) -> Result<TransferResolution> {
    let proof = das.asset_proof(asset_id).await?;
    if proof.proof.is_empty() {
        return Err(ChainError::ProofUnavailable(asset_id.to_string()));
    }

    let tree_address = decode_pubkey("tree_id", &proof.tree_id)?;
    let tree_account = ledger
        .fetch_account(&tree_address)
        .await?
        .ok_or_else(|| ChainError::TreeUnavailable(tree_address.to_string()))?;

    let canopy = tree::canopy_depth(&tree_account.data)?;
    let kept = proof.proof.len().saturating_sub(canopy as usize);
    debug!(
        "Asset {}: proof length {}, canopy depth {}, submitting {} nodes",
        asset_id,
        proof.proof.len(),
        canopy,
        kept
    );

    let mut proof_accounts = Vec::with_capacity(kept);
    for node in &proof.proof[..kept] {
        let address = decode_pubkey("proof node", node)?;
        proof_accounts.push(AccountMeta::new_readonly(address, false));
    }

    let asset = das.asset(asset_id).await?;
    let owner = decode_pubkey("owner", &asset.ownership.owner)?;

    if owner == *new_owner {
        debug!("Asset {} already owned by {}", asset_id, new_owner);
        return Ok(TransferResolution::NoTransferNeeded);
    }
    if owner != *expected_owner {
        info!(
            "Asset {} is owned by {} instead of {}; reporting conflict",
            asset_id, owner, expected_owner
        );
        return Ok(TransferResolution::OwnershipConflict { current_owner: owner });
    }

    let delegate = match &asset.ownership.delegate {
        Some(delegate) => decode_pubkey("delegate", delegate)?,
        None => owner,
    };
    let data_hash = asset
        .compression
        .data_hash
        .as_deref()
        .ok_or_else(|| ChainError::Decode {
            field: "data_hash".to_string(),
            message: format!("missing for asset {asset_id}"),
        })?;
    let creator_hash = asset
        .compression
        .creator_hash
        .as_deref()
        .ok_or_else(|| ChainError::Decode {
            field: "creator_hash".to_string(),
            message: format!("missing for asset {asset_id}"),
        })?;

    let (tree_authority, _) =
        Pubkey::find_program_address(&[tree_address.as_ref()], &BUBBLEGUM_PROGRAM_ID);

    Ok(TransferResolution::Plan(TransferPlan {
        tree: tree_address,
        tree_authority,
        leaf_owner: owner,
        leaf_delegate: delegate,
        new_leaf_owner: *new_owner,
        root: decode_hash32("root", &proof.root)?,
        data_hash: decode_hash32("data_hash", data_hash)?,
        creator_hash: decode_hash32("creator_hash", creator_hash)?,
        leaf_id: asset.compression.leaf_id,
        proof: proof_accounts,
    }))
}
