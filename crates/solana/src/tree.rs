//! Concurrent Merkle tree account layout
//!
//! The account-compression program stores each tree as a v1 header followed
//! by the tree body and an optional canopy: the top levels of the tree
//! cached on chain so clients can omit them from submitted proofs. Only the
//! header fields and section sizes are needed here; the tree body itself is
//! never interpreted.

use crate::error::{ChainError, Result};

/// account type (1) + header version (1) + max_buffer_size (4) +
/// max_depth (4) + authority (32) + creation_slot (8) + padding (6)
const HEADER_LEN: usize = 56;

const MAX_BUFFER_SIZE_OFFSET: usize = 2;
const MAX_DEPTH_OFFSET: usize = 6;

fn read_u32(data: &[u8], offset: usize, field: &str) -> Result<u32> {
    let bytes: [u8; 4] = data
        .get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| ChainError::Decode {
            field: field.to_string(),
            message: "tree account data truncated".to_string(),
        })?;
    Ok(u32::from_le_bytes(bytes))
}

/// Size of the tree body for the given shape: three u64 counters, one
/// change log entry per buffer slot and the rightmost path, each entry
/// holding a 32-byte node per level plus a 32-byte root/leaf and an
/// 8-byte index word.
fn tree_body_len(max_depth: u32, max_buffer_size: u32) -> usize {
    let entry = 40 + 32 * max_depth as usize;
    24 + (max_buffer_size as usize + 1) * entry
}

/// Number of proof levels the on-chain canopy covers for this account.
///
/// A canopy holding `n` nodes caches `log2(n + 2) - 1` levels; zero canopy
/// bytes mean the full proof must be supplied.
pub fn canopy_depth(data: &[u8]) -> Result<u32> {
    if data.len() < HEADER_LEN {
        return Err(ChainError::Decode {
            field: "tree header".to_string(),
            message: format!("account data too short: {} bytes", data.len()),
        });
    }

    let max_buffer_size = read_u32(data, MAX_BUFFER_SIZE_OFFSET, "max_buffer_size")?;
    let max_depth = read_u32(data, MAX_DEPTH_OFFSET, "max_depth")?;

    let body_end = HEADER_LEN + tree_body_len(max_depth, max_buffer_size);
    let canopy_bytes = data.len().checked_sub(body_end).ok_or_else(|| ChainError::Decode {
        field: "tree body".to_string(),
        message: format!(
            "account data shorter than declared tree shape (depth {max_depth}, buffer {max_buffer_size})"
        ),
    })?;

    let nodes = canopy_bytes / 32;
    if nodes == 0 {
        return Ok(0);
    }
    Ok((nodes as u64 + 2).ilog2() - 1)
}
