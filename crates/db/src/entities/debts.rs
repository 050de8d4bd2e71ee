//! `SeaORM` Entity for debts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::DebtKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: DebtKind,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub principal: Decimal,
    /// Annual percentage rate, e.g. `18.5`.
    #[sea_orm(column_type = "Decimal(Some((9, 4)))", nullable)]
    pub interest_rate_annual: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub min_payment_amount: Option<Decimal>,
    pub start_date: Option<Date>,
    pub due_date: Option<Date>,
    pub account_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::debt_payments::Entity")]
    DebtPayments,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::debt_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DebtPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
