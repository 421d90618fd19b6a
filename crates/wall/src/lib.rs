// Module declarations
pub mod config;
pub mod context;
pub mod edit;
pub mod error;
pub mod image;
pub mod logging;
pub mod purchase;
pub mod reconcile;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use context::ChainContext;
pub use error::WallError;
pub use reconcile::Reconciler;
pub use state::SharedState;
