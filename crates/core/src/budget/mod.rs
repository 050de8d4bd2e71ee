//! Budget usage aggregation and threshold alerts.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::BudgetError;
pub use service::{BudgetService, NEAR_BUDGET_PERCENTAGE};
pub use types::{
    AlertScope, AlertSeverity, BudgetAlert, BudgetCheck, BudgetDefinition, BudgetPeriod,
    BudgetSummary, BudgetUsage, CategoryCap, CategoryUsage, ExpenseLine,
};
