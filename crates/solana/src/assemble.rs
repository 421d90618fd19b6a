//! Transaction assembly
//!
//! Builds the per-brick purchase transaction and the aggregated edit
//! payment. Every transaction in a batch is stamped with the same recent
//! blockhash supplied by the caller, partially signed by the service
//! identity where it must co-authorize, and serialized base64 without
//! requiring the purchaser's signature yet.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use rand::Rng;
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::system_instruction;
use solana_sdk::system_program;
use solana_sdk::transaction::Transaction;

use crate::constants::{ACCOUNT_COMPRESSION_PROGRAM_ID, BUBBLEGUM_PROGRAM_ID, NOOP_PROGRAM_ID, TIP_ADDRESSES};
use crate::error::{ChainError, Result};
use crate::proof::TransferPlan;

/// Anchor discriminator of the Bubblegum `transfer` instruction.
const TRANSFER_DISCRIMINATOR: [u8; 8] = [163, 52, 200, 231, 140, 3, 69, 186];

#[derive(Debug, Clone)]
pub struct PurchaseParams {
    pub purchaser: Pubkey,
    pub funds_address: Pubkey,
    pub price_lamports: u64,
    pub service_fee_lamports: u64,
    pub tip_lamports: u64,
    pub compute_unit_limit: u32,
    pub compute_unit_price_micro_lamports: u64,
    pub blockhash: Hash,
}

/// Pick one relay tip destination from the fixed pool.
pub fn pick_tip_address() -> Pubkey {
    let mut rng = rand::thread_rng();
    TIP_ADDRESSES[rng.gen_range(0..TIP_ADDRESSES.len())]
}

/// The Bubblegum leaf transfer. The leaf owner signs; the trimmed proof
/// rides along as trailing read-only accounts.
pub fn transfer_instruction(plan: &TransferPlan) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(plan.tree_authority, false),
        AccountMeta::new_readonly(plan.leaf_owner, true),
        AccountMeta::new_readonly(plan.leaf_delegate, false),
        AccountMeta::new_readonly(plan.new_leaf_owner, false),
        AccountMeta::new(plan.tree, false),
        AccountMeta::new_readonly(*NOOP_PROGRAM_ID, false),
        AccountMeta::new_readonly(*ACCOUNT_COMPRESSION_PROGRAM_ID, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(plan.proof.iter().cloned());

    let mut data = Vec::with_capacity(8 + 32 * 3 + 8 + 4);
    data.extend_from_slice(&TRANSFER_DISCRIMINATOR);
    data.extend_from_slice(&plan.root);
    data.extend_from_slice(&plan.data_hash);
    data.extend_from_slice(&plan.creator_hash);
    data.extend_from_slice(&plan.leaf_id.to_le_bytes());
    data.extend_from_slice(&(plan.leaf_id as u32).to_le_bytes());

    Instruction {
        program_id: *BUBBLEGUM_PROGRAM_ID,
        accounts,
        data,
    }
}

fn encode_transaction(tx: &Transaction) -> Result<String> {
    let bytes = bincode::serialize(tx).map_err(|e| ChainError::Decode {
        field: "transaction".to_string(),
        message: e.to_string(),
    })?;
    Ok(BASE64_STANDARD.encode(bytes))
}

/// Build one purchase transaction, co-signed by the service identity.
///
/// Instruction order is fixed: compute-unit limit, compute-unit price, the
/// brick payment, the service's minor contribution, the leaf transfer (when
/// a plan was resolved), and the relay tip.
pub fn build_purchase_transaction(
    params: &PurchaseParams,
    service: &Keypair,
    transfer: Option<&TransferPlan>,
) -> Result<String> {
    let mut instructions = vec![
        ComputeBudgetInstruction::set_compute_unit_limit(params.compute_unit_limit),
        ComputeBudgetInstruction::set_compute_unit_price(params.compute_unit_price_micro_lamports),
        system_instruction::transfer(&params.purchaser, &params.funds_address, params.price_lamports),
        system_instruction::transfer(
            &service.pubkey(),
            &params.funds_address,
            params.service_fee_lamports,
        ),
    ];
    if let Some(plan) = transfer {
        instructions.push(transfer_instruction(plan));
    }
    instructions.push(system_instruction::transfer(
        &params.purchaser,
        &pick_tip_address(),
        params.tip_lamports,
    ));

    let mut tx = Transaction::new_with_payer(&instructions, Some(&params.purchaser));
    tx.try_partial_sign(&[service], params.blockhash)
        .map_err(|e| ChainError::Signing(e.to_string()))?;
    encode_transaction(&tx)
}

/// Build the single aggregated edit payment. No service co-signature is
/// needed; the payer signs after receiving the serialized transaction.
pub fn build_edit_payment_transaction(
    payer: &Pubkey,
    funds_address: &Pubkey,
    total_lamports: u64,
    tip_lamports: u64,
    compute_unit_limit: u32,
    compute_unit_price_micro_lamports: u64,
    blockhash: Hash,
) -> Result<String> {
    let instructions = vec![
        ComputeBudgetInstruction::set_compute_unit_limit(compute_unit_limit),
        ComputeBudgetInstruction::set_compute_unit_price(compute_unit_price_micro_lamports),
        system_instruction::transfer(payer, funds_address, total_lamports),
        system_instruction::transfer(payer, &pick_tip_address(), tip_lamports),
    ];

    let mut tx = Transaction::new_with_payer(&instructions, Some(payer));
    tx.message.recent_blockhash = blockhash;
    encode_transaction(&tx)
}
