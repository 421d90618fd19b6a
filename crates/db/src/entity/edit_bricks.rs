//! EditRecord entity
//!
//! Append-only ledger of consumed edit payments. `transaction_hash` is
//! the primary key, so one on-chain transaction authorizes at most one
//! edit.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "edit_bricks")]
pub struct Model {
    pub username: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
