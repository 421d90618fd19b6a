use std::sync::Arc;

use solana::das::DasApi;
use solana::ledger::LedgerApi;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;

/// Chain-facing handles shared by the request paths and the reconciler.
/// Both external interfaces are traits so tests swap in fakes.
#[derive(Clone)]
pub struct ChainContext {
    pub das: Arc<dyn DasApi>,
    pub ledger: Arc<dyn LedgerApi>,
    pub service: Arc<Keypair>,
}

impl ChainContext {
    pub fn new(das: Arc<dyn DasApi>, ledger: Arc<dyn LedgerApi>, service: Arc<Keypair>) -> Self {
        Self { das, ledger, service }
    }

    pub fn service_address(&self) -> Pubkey {
        self.service.pubkey()
    }
}
