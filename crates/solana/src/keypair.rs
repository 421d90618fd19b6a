//! Service identity loading
//!
//! The service keypair co-signs ownership transfers and pays its minor
//! contribution in every purchase transaction. Two key shapes are accepted:
//! a base-58 string in `SERVICE_SECRET_KEY`, or a JSON byte-array keypair
//! file (the shape the Solana CLI writes) named by `SERVICE_KEYPAIR_PATH`.

use std::env;

use anyhow::{anyhow, Context, Result};
use solana_sdk::signature::Keypair;
use tracing::debug;

fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair> {
    Keypair::from_bytes(bytes).map_err(|e| anyhow!("invalid keypair bytes: {e}"))
}

/// Parse a base-58 encoded 64-byte secret key.
pub fn parse_base58_keypair(encoded: &str) -> Result<Keypair> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .context("secret key is not valid base-58")?;
    keypair_from_bytes(&bytes)
}

/// Parse the JSON byte-array format produced by the Solana tooling.
pub fn parse_json_keypair(raw: &str) -> Result<Keypair> {
    let bytes: Vec<u8> = serde_json::from_str(raw).context("keypair file is not a JSON byte array")?;
    keypair_from_bytes(&bytes)
}

/// Load the service keypair from the environment.
pub fn load_service_keypair() -> Result<Keypair> {
    if let Ok(encoded) = env::var("SERVICE_SECRET_KEY") {
        debug!("Loading service keypair from SERVICE_SECRET_KEY");
        return parse_base58_keypair(&encoded);
    }

    let path = env::var("SERVICE_KEYPAIR_PATH")
        .context("neither SERVICE_SECRET_KEY nor SERVICE_KEYPAIR_PATH is set")?;
    debug!("Loading service keypair from {}", path);
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read keypair file {path}"))?;
    parse_json_keypair(&raw)
}
