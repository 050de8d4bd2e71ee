//! `SeaORM` entities for the ledger tables.

pub mod accounts;
pub mod budget_categories;
pub mod budgets;
pub mod categories;
pub mod debt_payments;
pub mod debts;
pub mod goal_contributions;
pub mod goals;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod transfers;
