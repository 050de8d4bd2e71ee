//! `SeaORM` Entity for transfers table.
//!
//! A transfer owns no balance of its own; it pairs an outgoing and an
//! incoming transfer-leg transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub from_transaction_id: Uuid,
    #[sea_orm(unique)]
    pub to_transaction_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::FromTransactionId",
        to = "super::transactions::Column::Id"
    )]
    FromTransaction,
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::ToTransactionId",
        to = "super::transactions::Column::Id"
    )]
    ToTransaction,
}

impl ActiveModelBehavior for ActiveModel {}
