//! Asset ownership oracle
//!
//! Pages through the indexer's view of a wallet's compressed assets. The
//! result is the only evidence of ownership the rest of the system accepts;
//! client-supplied claims are never trusted.

use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::constants::DAS_PAGE_LIMIT;
use crate::das::{AssetItem, DasApi};

/// Fetch every live compressed asset the wallet owns.
///
/// Pagination starts at page 1 and continues while a page comes back with
/// exactly the requested limit; the first short page ends the walk. On any
/// indexer error the walk stops early and whatever was accumulated so far
/// is returned. A partial result means "no proof of additional ownership"
/// and must never be treated as an error by callers.
pub async fn fetch_owned_assets(das: &dyn DasApi, owner: &Pubkey) -> Vec<AssetItem> {
    let owner = owner.to_string();
    let mut assets = Vec::new();
    let mut page = 1u64;

    loop {
        let result = das.assets_by_owner(&owner, page, DAS_PAGE_LIMIT).await;
        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    "Asset listing for {} failed on page {}: {}; returning {} assets fetched so far",
                    owner,
                    page,
                    e,
                    assets.len()
                );
                break;
            }
        };

        let fetched = batch.items.len();
        assets.extend(
            batch
                .items
                .into_iter()
                .filter(|item| !item.burnt && item.compression.compressed),
        );

        debug!("Fetched page {} for {}: {} items", page, owner, fetched);
        if (fetched as u64) < DAS_PAGE_LIMIT {
            break;
        }
        page += 1;
    }

    debug!("Owner {} holds {} live compressed assets", owner, assets.len());
    assets
}
