//! Static catalog loading
//!
//! The catalog file is a JSON array mapping coordinates to the asset
//! identifier minted for that cell. It is read once at startup and used to
//! seed `wall_bricks`; rows that already exist are left untouched, so the
//! asset binding made at first load is never changed.

use std::path::Path;

use anyhow::{Context, Result};
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use serde::Deserialize;
use tracing::{debug, info};

use crate::entity::wall_bricks;
use crate::store;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub x: i32,
    pub y: i32,
    pub asset_id: String,
}

/// Read and parse the catalog file.
pub async fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse catalog file {}", path.display()))?;
    info!("Loaded {} catalog entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Insert every catalog entry whose coordinates are not yet present.
/// Returns the number of newly seeded bricks.
pub async fn seed_catalog(db: &DatabaseConnection, entries: &[CatalogEntry]) -> Result<u64> {
    if entries.is_empty() {
        return Ok(0);
    }

    let coords: Vec<(i32, i32)> = entries.iter().map(|e| (e.x, e.y)).collect();
    let (existing, _) = store::find_bricks(db, &coords).await?;
    let known: std::collections::HashSet<(i32, i32)> =
        existing.into_iter().map(|b| (b.x, b.y)).collect();

    let fresh: Vec<wall_bricks::ActiveModel> = entries
        .iter()
        .filter(|e| !known.contains(&(e.x, e.y)))
        .map(|e| wall_bricks::ActiveModel {
            x: Set(e.x),
            y: Set(e.y),
            asset_id: Set(e.asset_id.clone()),
            purchased: Set(false),
            image_location: Set(None),
        })
        .collect();

    if fresh.is_empty() {
        debug!("Catalog already seeded, nothing to insert");
        return Ok(0);
    }

    let count = fresh.len() as u64;
    wall_bricks::Entity::insert_many(fresh).exec(db).await?;
    info!("Seeded {} new bricks from catalog", count);
    Ok(count)
}
