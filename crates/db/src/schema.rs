//! Schema helper for tests and local bring-up. Production schema bootstrap
//! lives outside this repository.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

use crate::entity::{edit_bricks, wall_bricks};

/// Create the wall tables from the entity definitions if they do not exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut bricks = schema.create_table_from_entity(wall_bricks::Entity);
    db.execute(backend.build(bricks.if_not_exists())).await?;

    let mut edits = schema.create_table_from_entity(edit_bricks::Entity);
    db.execute(backend.build(edits.if_not_exists())).await?;

    Ok(())
}
