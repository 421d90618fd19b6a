//! WallBrick entity
//!
//! One row per canvas cell. The `(x, y)` pair is the composite primary
//! key; `asset_id` is bound once at catalog-load time and never changes.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wall_bricks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub x: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub y: i32,
    pub asset_id: String,
    pub purchased: bool,
    pub image_location: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
