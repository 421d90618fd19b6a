use std::str::FromStr;

use once_cell::sync::Lazy;
use solana_sdk::pubkey::Pubkey;

/// Page size for the indexer's `getAssetsByOwner` pagination.
pub const DAS_PAGE_LIMIT: u64 = 1000;

/// Number of bricks assembled concurrently before moving to the next chunk.
pub const PURCHASE_CHUNK_SIZE: usize = 100;

/// Bounded retry policy for finalized-transaction lookups.
pub const CONFIRM_MAX_ATTEMPTS: u32 = 10;
pub const CONFIRM_RETRY_DELAY_MS: u64 = 3_000;

/// Compute budget defaults for assembled transactions.
pub const DEFAULT_COMPUTE_UNIT_LIMIT: u32 = 300_000;
pub const DEFAULT_COMPUTE_UNIT_PRICE_MICRO_LAMPORTS: u64 = 10_000;

/// Bubblegum compressed-NFT program.
pub static BUBBLEGUM_PROGRAM_ID: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str("BGUmAp9Gq7iTEuizy4pqaxsTyUCBK68MDcK76StJLbBB").expect("valid program id")
});

/// SPL account compression program (owns the Merkle tree accounts).
pub static ACCOUNT_COMPRESSION_PROGRAM_ID: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str("cmtDvXumGCrqC1Age74AVPhSRVXJMd8PJS91L8KbNCK").expect("valid program id")
});

/// SPL noop program (log wrapper for compression events).
pub static NOOP_PROGRAM_ID: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str("noopb9bkMVfRPU8AsbpTUg8AQkHtKwMYZiFUjNRtMmV").expect("valid program id")
});

/// Relay tip destinations; one is chosen pseudo-randomly per transaction.
pub static TIP_ADDRESSES: Lazy<Vec<Pubkey>> = Lazy::new(|| {
    [
        "96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5",
        "HFqU5x63VTqvQss8hp11i4wVV8bD44PvwucfZ2bU7gRe",
        "Cw8CFyM9FkoMi7K7Crf6HNQqf4uEMzpKw6QNghXLvLkY",
        "ADaUMid9yfUytqMBgopwjb2DTLSokTSzL1zt6iGPaS49",
        "DfXygSm4jCyNCybVYYK6DwvWqjKee8pbDmJGcLWNDXjh",
        "ADuUkR4vqLUMWXxW9gh6D6L8pMSawimctcNZ5pGwDcEt",
        "DttWaMuVvTiduZRnguLF7jNxTgiMBZ1hyAumKUiL2KRL",
        "3AVi9Tg9Uo68tJfuvoKvqKNWKkC5wPdSSdeBnizKZ6jT",
    ]
    .iter()
    .map(|addr| Pubkey::from_str(addr).expect("valid tip address"))
    .collect()
});
