//! Ledger node access
//!
//! [`LedgerApi`] is the narrow interface the assembler, resolver and
//! confirmation path consume; [`RpcLedger`] backs it with the nonblocking
//! RPC client. Tests substitute in-memory fakes.

use std::env;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use solana_transaction_status::UiTransactionEncoding;
use tracing::debug;

use crate::error::{ChainError, Result};

/// Resolve the RPC URL based on the following priority:
/// 1. SOLANA_RPC_URL env var if set (allows custom endpoints)
/// 2. Cluster-specific SOLANA_RPC_URL_<CLUSTER> env var
/// 3. Default public endpoint for SOLANA_CLUSTER (defaults to devnet)
pub fn resolve_rpc_url() -> Result<String> {
    if let Ok(custom_url) = env::var("SOLANA_RPC_URL") {
        return Ok(custom_url);
    }

    let cluster = env::var("SOLANA_CLUSTER")
        .unwrap_or_else(|_| "devnet".to_string())
        .to_lowercase();

    match cluster.as_str() {
        "devnet" | "testnet" | "mainnet" => {}
        _ => {
            return Err(ChainError::Rpc(format!(
                "invalid cluster '{cluster}'; must be one of: devnet, testnet, mainnet"
            )));
        }
    }

    let cluster_specific_var = format!("SOLANA_RPC_URL_{}", cluster.to_uppercase());
    if let Ok(cluster_url) = env::var(&cluster_specific_var) {
        return Ok(cluster_url);
    }

    let url = match cluster.as_str() {
        "devnet" => "https://api.devnet.solana.com".to_string(),
        "testnet" => "https://api.testnet.solana.com".to_string(),
        "mainnet" => "https://api.mainnet-beta.solana.com".to_string(),
        _ => unreachable!(),
    };
    Ok(url)
}

/// Narrow read/query interface over the ledger node.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Latest recent blockhash usable as a transaction checkpoint.
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Raw account data, or `None` if the account does not exist.
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>>;

    /// A finalized transaction by signature. `None` when the transaction is
    /// not (yet) visible; callers own the retry policy.
    async fn fetch_transaction(&self, signature: &Signature)
        -> Result<Option<VersionedTransaction>>;
}

pub struct RpcLedger {
    client: RpcClient,
}

impl RpcLedger {
    pub fn new(url: String) -> Self {
        Self {
            client: RpcClient::new(url),
        }
    }
}

#[async_trait]
impl LedgerApi for RpcLedger {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| ChainError::Rpc(format!("get_latest_blockhash: {e}")))
    }

    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .map_err(|e| ChainError::Rpc(format!("get_account {address}: {e}")))?;
        Ok(response.value)
    }

    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<VersionedTransaction>> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            commitment: Some(CommitmentConfig::finalized()),
            max_supported_transaction_version: Some(0),
        };

        match self.client.get_transaction_with_config(signature, config).await {
            Ok(confirmed) => Ok(confirmed.transaction.transaction.decode()),
            Err(e) => {
                // Not-yet-finalized and not-found both surface as errors from
                // the node; the confirmation loop treats them as a miss.
                debug!("Transaction {} not available: {}", signature, e);
                Ok(None)
            }
        }
    }
}
