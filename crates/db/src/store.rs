use anyhow::Result;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
};
use tracing::debug;

use crate::entity::{edit_bricks, wall_bricks};

/// Fetch the bricks at the given coordinates, preserving request order.
/// Returns the rows found plus the coordinates with no matching row.
pub async fn find_bricks(
    db: &DatabaseConnection,
    coords: &[(i32, i32)],
) -> Result<(Vec<wall_bricks::Model>, Vec<(i32, i32)>)> {
    if coords.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut cond = Condition::any();
    for (x, y) in coords {
        cond = cond.add(
            Condition::all()
                .add(wall_bricks::Column::X.eq(*x))
                .add(wall_bricks::Column::Y.eq(*y)),
        );
    }

    let rows = wall_bricks::Entity::find().filter(cond).all(db).await?;
    debug!("Fetched {} of {} requested bricks", rows.len(), coords.len());

    let mut by_coord: std::collections::HashMap<(i32, i32), wall_bricks::Model> =
        rows.into_iter().map(|b| ((b.x, b.y), b)).collect();

    let mut found = Vec::with_capacity(coords.len());
    let mut missing = Vec::new();
    for coord in coords {
        match by_coord.remove(coord) {
            Some(brick) => found.push(brick),
            None => missing.push(*coord),
        }
    }
    Ok((found, missing))
}

/// All bricks not yet marked purchased.
pub async fn unpurchased_bricks(db: &DatabaseConnection) -> Result<Vec<wall_bricks::Model>> {
    let rows = wall_bricks::Entity::find()
        .filter(wall_bricks::Column::Purchased.eq(false))
        .all(db)
        .await?;
    Ok(rows)
}

/// Bulk-mark the bricks backed by the given assets as purchased.
/// Setting `purchased = true` twice is harmless, so no locking is needed;
/// the filter still excludes already-purchased rows to keep the affected
/// count meaningful. Returns the number of rows updated.
pub async fn mark_purchased_by_assets(
    db: &DatabaseConnection,
    asset_ids: &[String],
) -> Result<u64> {
    if asset_ids.is_empty() {
        return Ok(0);
    }

    let result = wall_bricks::Entity::update_many()
        .col_expr(wall_bricks::Column::Purchased, Expr::value(true))
        .filter(wall_bricks::Column::AssetId.is_in(asset_ids.iter().cloned()))
        .filter(wall_bricks::Column::Purchased.eq(false))
        .exec(db)
        .await?;
    debug!("Marked {} bricks purchased", result.rows_affected);
    Ok(result.rows_affected)
}

/// Point the brick at stored image content.
pub async fn set_image_location(
    db: &DatabaseConnection,
    x: i32,
    y: i32,
    location: Option<String>,
) -> Result<u64> {
    let result = wall_bricks::Entity::update_many()
        .col_expr(wall_bricks::Column::ImageLocation, Expr::value(location))
        .filter(wall_bricks::Column::X.eq(x))
        .filter(wall_bricks::Column::Y.eq(y))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Clear the image content reference for every given coordinate, re-opening
/// the upload slot after a paid edit.
pub async fn clear_image_locations(
    db: &DatabaseConnection,
    coords: &[(i32, i32)],
) -> Result<u64> {
    let mut total = 0;
    for (x, y) in coords {
        total += set_image_location(db, *x, *y, None).await?;
    }
    Ok(total)
}

/// Whether a transaction hash has already been consumed for an edit.
pub async fn edit_exists(db: &DatabaseConnection, transaction_hash: &str) -> Result<bool> {
    let existing = edit_bricks::Entity::find_by_id(transaction_hash.to_string())
        .one(db)
        .await?;
    Ok(existing.is_some())
}

/// Record a consumed edit payment. The primary key on `transaction_hash`
/// rejects a second insert of the same hash at the database level.
pub async fn record_edit(
    db: &DatabaseConnection,
    username: &str,
    transaction_hash: &str,
) -> Result<()> {
    let record = edit_bricks::ActiveModel {
        username: Set(username.to_string()),
        transaction_hash: Set(transaction_hash.to_string()),
    };
    edit_bricks::Entity::insert(record).exec(db).await?;
    debug!("Recorded edit by {} for tx {}", username, transaction_hash);
    Ok(())
}
