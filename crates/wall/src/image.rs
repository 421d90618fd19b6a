//! Uploaded image storage
//!
//! Payloads land in UUID-named files under the configured image directory;
//! the brick row then points at the stored file. A brick accepts content
//! once per purchase-to-edit lifecycle: the slot is re-opened only by a
//! confirmed paid edit.

use std::path::{Path, PathBuf};

use sea_orm::DatabaseConnection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::WallError;
use crate::state::SharedState;

/// Write an uploaded payload to a fresh UUID-named file.
pub async fn store_image(image_dir: &Path, bytes: &[u8]) -> Result<PathBuf, WallError> {
    tokio::fs::create_dir_all(image_dir).await?;
    let path = image_dir.join(format!("{}.png", Uuid::new_v4()));
    tokio::fs::write(&path, bytes).await?;
    debug!("Stored {} byte image at {}", bytes.len(), path.display());
    Ok(path)
}

/// Bind stored image content to a brick.
pub async fn attach_image(
    db: &DatabaseConnection,
    state: &SharedState,
    x: i32,
    y: i32,
    location: &str,
) -> Result<(), WallError> {
    let (bricks, missing) = db::store::find_bricks(db, &[(x, y)])
        .await
        .map_err(WallError::from_store)?;
    if !missing.is_empty() {
        return Err(WallError::UnknownBricks { missing });
    }
    let brick = &bricks[0];

    if !brick.purchased {
        return Err(WallError::NotPurchased { x, y });
    }
    if brick.image_location.as_deref().unwrap_or("") != "" {
        return Err(WallError::AlreadyHasImage { x, y });
    }

    db::store::set_image_location(db, x, y, Some(location.to_string()))
        .await
        .map_err(WallError::from_store)?;
    state.invalidate_render().await;

    info!("Attached image {} to brick ({}, {})", location, x, y);
    Ok(())
}
