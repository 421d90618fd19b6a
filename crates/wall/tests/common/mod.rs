//! Shared fixtures: an in-memory store and scripted chain fakes.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use solana::das::{AssetCompression, AssetItem, AssetOwnership, AssetPage, AssetProof, DasApi};
use solana::error::{ChainError, Result as ChainResult};
use solana::ledger::LedgerApi;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::VersionedTransaction;
use wall::{ChainContext, Config, SharedState};

pub async fn setup_db() -> DatabaseConnection {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    db::schema::create_tables(&db).await.expect("create tables");
    db
}

pub async fn seed_brick(db: &DatabaseConnection, x: i32, y: i32, asset_id: &str) {
    let brick = db::wall_bricks::ActiveModel {
        x: Set(x),
        y: Set(y),
        asset_id: Set(asset_id.to_string()),
        purchased: Set(false),
        image_location: Set(None),
    };
    db::wall_bricks::Entity::insert(brick)
        .exec(db)
        .await
        .expect("seed brick");
}

pub async fn brick_at(db: &DatabaseConnection, x: i32, y: i32) -> db::wall_bricks::Model {
    db::store::find_bricks(db, &[(x, y)])
        .await
        .expect("find brick")
        .0
        .remove(0)
}

pub fn test_config() -> Config {
    Config {
        rpc_url: "http://localhost:8899".to_string(),
        das_url: "http://localhost:8899".to_string(),
        database_url: "sqlite::memory:".to_string(),
        funds_address: Pubkey::new_unique(),
        brick_price_lamports: 1_000_000,
        service_fee_lamports: 5_000,
        edit_price_lamports: 250_000,
        tip_lamports: 10_000,
        compute_unit_limit: 300_000,
        compute_unit_price_micro_lamports: 10_000,
        catalog_path: PathBuf::from("catalog.json"),
        image_dir: PathBuf::from("images"),
        reconcile_interval_secs: 300,
        confirm_max_attempts: 2,
        confirm_retry_delay_ms: 1,
    }
}

fn hash32_b58(seed: u8) -> String {
    bs58::encode([seed; 32]).into_string()
}

/// Synthetic account-compression tree data: v1 header, zeroed body, canopy.
fn tree_account_data(max_depth: u32, max_buffer_size: u32, canopy_depth: u32) -> Vec<u8> {
    let entry = 40 + 32 * max_depth as usize;
    let body = 24 + (max_buffer_size as usize + 1) * entry;
    let canopy_nodes = if canopy_depth == 0 {
        0
    } else {
        (1usize << (canopy_depth + 1)) - 2
    };
    let mut data = vec![0u8; 56 + body + canopy_nodes * 32];
    data[0] = 1;
    data[2..6].copy_from_slice(&max_buffer_size.to_le_bytes());
    data[6..10].copy_from_slice(&max_depth.to_le_bytes());
    data
}

#[derive(Default)]
pub struct FakeDas {
    pub proofs: Mutex<HashMap<String, AssetProof>>,
    pub assets: Mutex<HashMap<String, AssetItem>>,
}

impl FakeDas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset owned by `owner`, with a proof anchored in `tree`.
    pub fn add_asset(&self, asset_id: &str, owner: &Pubkey, tree: &Pubkey, proof_len: usize) {
        self.proofs.lock().unwrap().insert(
            asset_id.to_string(),
            AssetProof {
                root: hash32_b58(1),
                proof: (0..proof_len)
                    .map(|_| Pubkey::new_unique().to_string())
                    .collect(),
                node_index: 0,
                leaf: hash32_b58(2),
                tree_id: tree.to_string(),
            },
        );
        self.assets.lock().unwrap().insert(
            asset_id.to_string(),
            AssetItem {
                id: asset_id.to_string(),
                ownership: AssetOwnership {
                    owner: owner.to_string(),
                    delegate: None,
                },
                compression: AssetCompression {
                    compressed: true,
                    tree: Some(tree.to_string()),
                    data_hash: Some(hash32_b58(3)),
                    creator_hash: Some(hash32_b58(4)),
                    leaf_id: 1,
                },
                burnt: false,
            },
        );
    }

}

#[async_trait]
impl DasApi for FakeDas {
    async fn assets_by_owner(&self, owner: &str, page: u64, limit: u64) -> ChainResult<AssetPage> {
        let items: Vec<AssetItem> = if page == 1 {
            self.assets
                .lock()
                .unwrap()
                .values()
                .filter(|a| a.ownership.owner == owner)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        Ok(AssetPage {
            total: items.len() as u64,
            limit,
            page,
            items,
        })
    }

    async fn asset_proof(&self, asset_id: &str) -> ChainResult<AssetProof> {
        self.proofs
            .lock()
            .unwrap()
            .get(asset_id)
            .cloned()
            .ok_or_else(|| ChainError::ProofUnavailable(asset_id.to_string()))
    }

    async fn asset(&self, asset_id: &str) -> ChainResult<AssetItem> {
        self.assets
            .lock()
            .unwrap()
            .get(asset_id)
            .cloned()
            .ok_or_else(|| ChainError::Das(format!("unknown asset {asset_id}")))
    }
}

#[derive(Default)]
pub struct FakeLedger {
    pub blockhash: Hash,
    pub accounts: Mutex<HashMap<Pubkey, Account>>,
    pub transactions: Mutex<HashMap<Signature, VersionedTransaction>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            blockhash: Hash::new_unique(),
            ..Default::default()
        }
    }

    pub fn add_tree(&self, tree: &Pubkey, max_depth: u32, canopy_depth: u32) {
        self.accounts.lock().unwrap().insert(
            *tree,
            Account {
                lamports: 1,
                data: tree_account_data(max_depth, 64, canopy_depth),
                owner: Pubkey::new_unique(),
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub fn add_transaction(&self, signature: Signature, tx: VersionedTransaction) {
        self.transactions.lock().unwrap().insert(signature, tx);
    }
}

#[async_trait]
impl LedgerApi for FakeLedger {
    async fn latest_blockhash(&self) -> ChainResult<Hash> {
        Ok(self.blockhash)
    }

    async fn fetch_account(&self, address: &Pubkey) -> ChainResult<Option<Account>> {
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> ChainResult<Option<VersionedTransaction>> {
        Ok(self.transactions.lock().unwrap().get(signature).cloned())
    }
}

pub struct TestHarness {
    pub db: DatabaseConnection,
    pub das: Arc<FakeDas>,
    pub ledger: Arc<FakeLedger>,
    pub chain: ChainContext,
    pub config: Config,
    pub state: SharedState,
}

pub async fn setup() -> TestHarness {
    let db = setup_db().await;
    let das = Arc::new(FakeDas::new());
    let ledger = Arc::new(FakeLedger::new());
    let service = Arc::new(Keypair::new());
    let chain = ChainContext::new(das.clone(), ledger.clone(), service);
    TestHarness {
        db,
        das,
        ledger,
        chain,
        config: test_config(),
        state: SharedState::new(),
    }
}
