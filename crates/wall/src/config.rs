//! Service configuration
//!
//! Every knob is an environment variable with a code default, read once at
//! startup. The binary loads `.env` through dotenvy before this runs.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use solana::resolve_rpc_url;
use solana_sdk::pubkey::Pubkey;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.parse::<T>().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub das_url: String,
    pub database_url: String,
    /// Destination of all brick and edit payments.
    pub funds_address: Pubkey,
    pub brick_price_lamports: u64,
    pub service_fee_lamports: u64,
    pub edit_price_lamports: u64,
    pub tip_lamports: u64,
    pub compute_unit_limit: u32,
    pub compute_unit_price_micro_lamports: u64,
    pub catalog_path: PathBuf,
    pub image_dir: PathBuf,
    pub reconcile_interval_secs: u64,
    pub confirm_max_attempts: u32,
    pub confirm_retry_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let rpc_url = resolve_rpc_url().map_err(|e| anyhow::anyhow!(e.to_string()))?;
        // Most DAS providers serve the read methods on the RPC endpoint
        // itself; DAS_URL overrides when the indexer lives elsewhere.
        let das_url = env::var("DAS_URL").unwrap_or_else(|_| rpc_url.clone());

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let funds_address = env::var("FUNDS_ADDRESS").context("FUNDS_ADDRESS is not set")?;
        let funds_address = Pubkey::from_str(&funds_address)
            .with_context(|| format!("FUNDS_ADDRESS '{funds_address}' is not a valid address"))?;

        Ok(Self {
            rpc_url,
            das_url,
            database_url,
            funds_address,
            brick_price_lamports: env_or("BRICK_PRICE_LAMPORTS", 100_000_000),
            service_fee_lamports: env_or("SERVICE_FEE_LAMPORTS", 5_000),
            edit_price_lamports: env_or("EDIT_PRICE_LAMPORTS", 10_000_000),
            tip_lamports: env_or("TIP_LAMPORTS", 100_000),
            compute_unit_limit: env_or(
                "COMPUTE_UNIT_LIMIT",
                solana::constants::DEFAULT_COMPUTE_UNIT_LIMIT,
            ),
            compute_unit_price_micro_lamports: env_or(
                "COMPUTE_UNIT_PRICE_MICRO_LAMPORTS",
                solana::constants::DEFAULT_COMPUTE_UNIT_PRICE_MICRO_LAMPORTS,
            ),
            catalog_path: PathBuf::from(
                env::var("CATALOG_PATH").unwrap_or_else(|_| "catalog.json".to_string()),
            ),
            image_dir: PathBuf::from(
                env::var("IMAGE_DIR").unwrap_or_else(|_| "images".to_string()),
            ),
            reconcile_interval_secs: env_or("RECONCILE_INTERVAL_SECS", 300),
            confirm_max_attempts: env_or(
                "CONFIRM_MAX_ATTEMPTS",
                solana::constants::CONFIRM_MAX_ATTEMPTS,
            ),
            confirm_retry_delay_ms: env_or(
                "CONFIRM_RETRY_DELAY_MS",
                solana::constants::CONFIRM_RETRY_DELAY_MS,
            ),
        })
    }
}
