use solana::ChainError;
use thiserror::Error;

/// Error taxonomy surfaced to the HTTP layer. Validation errors map to
/// 4xx, conflicts to 409, everything else to an opaque internal error.
#[derive(Error, Debug)]
pub enum WallError {
    #[error("unknown bricks: {missing:?}")]
    UnknownBricks { missing: Vec<(i32, i32)> },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid transaction signature: {0}")]
    InvalidSignature(String),

    #[error("bricks not editable (not purchased: {not_purchased:?}, missing image: {missing_image:?})")]
    NotEditable {
        not_purchased: Vec<(i32, i32)>,
        missing_image: Vec<(i32, i32)>,
    },

    #[error("brick ({x}, {y}) is not purchased")]
    NotPurchased { x: i32, y: i32 },

    #[error("brick ({x}, {y}) already has image content")]
    AlreadyHasImage { x: i32, y: i32 },

    #[error("transaction {tx_hash} was already consumed for an edit")]
    EditAlreadyConsumed { tx_hash: String },

    #[error("payment transaction {0} not found")]
    PaymentNotFound(String),

    #[error("payment does not match the expected transfer: {0}")]
    PaymentMismatch(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chain error: {0}")]
    Chain(ChainError),
}

impl From<ChainError> for WallError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::PaymentNotFound(sig) => WallError::PaymentNotFound(sig),
            ChainError::PaymentMismatch(msg) => WallError::PaymentMismatch(msg),
            other => WallError::Chain(other),
        }
    }
}

impl WallError {
    /// Store operations bubble up as `anyhow::Error`; recover the database
    /// error class where possible.
    pub(crate) fn from_store(err: anyhow::Error) -> Self {
        match err.downcast::<sea_orm::DbErr>() {
            Ok(db_err) => WallError::Database(db_err),
            Err(other) => WallError::Chain(ChainError::Other(other)),
        }
    }

    /// Caller mistakes: bad input that will never succeed on retry.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WallError::UnknownBricks { .. }
                | WallError::InvalidAddress(_)
                | WallError::InvalidSignature(_)
        )
    }

    /// State conflicts: the request was well-formed but the current state
    /// of the wall or the edit ledger rejects it.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            WallError::NotEditable { .. }
                | WallError::NotPurchased { .. }
                | WallError::AlreadyHasImage { .. }
                | WallError::EditAlreadyConsumed { .. }
                | WallError::PaymentNotFound(_)
                | WallError::PaymentMismatch(_)
        )
    }

    /// Failures of this service or its collaborators; surfaced opaquely.
    pub fn is_external(&self) -> bool {
        !self.is_validation() && !self.is_conflict()
    }
}
