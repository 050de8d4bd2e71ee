//! `SeaORM` Entity for goals table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub target_amount: Decimal,
    /// Sum of the contributions' applied amounts; never above the target.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_amount: Decimal,
    pub currency: String,
    pub due_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::goal_contributions::Entity")]
    GoalContributions,
}

impl Related<super::goal_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoalContributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
