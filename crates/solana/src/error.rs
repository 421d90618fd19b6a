use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("indexer request failed: {0}")]
    Das(String),

    #[error("no Merkle proof available for asset {0}")]
    ProofUnavailable(String),

    #[error("Merkle tree account {0} not found on chain")]
    TreeUnavailable(String),

    #[error("failed to decode {field}: {message}")]
    Decode { field: String, message: String },

    #[error("transaction {0} not found after retries")]
    PaymentNotFound(String),

    #[error("transaction does not match expected payment: {0}")]
    PaymentMismatch(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChainError>;
