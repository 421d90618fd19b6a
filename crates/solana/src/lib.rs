// Module declarations
pub mod assemble;
pub mod assets;
pub mod confirm;
pub mod constants;
pub mod das;
pub mod error;
pub mod keypair;
pub mod ledger;
pub mod proof;
pub mod tree;

// Re-export commonly used types
pub use assemble::{build_edit_payment_transaction, build_purchase_transaction, PurchaseParams};
pub use assets::fetch_owned_assets;
pub use confirm::{verify_payment, PaymentCheck};
pub use das::{AssetItem, AssetPage, AssetProof, DasApi, DasClient};
pub use error::{ChainError, Result};
pub use keypair::load_service_keypair;
pub use ledger::{resolve_rpc_url, LedgerApi, RpcLedger};
pub use proof::{resolve_transfer, TransferPlan, TransferResolution};
