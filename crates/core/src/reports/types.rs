//! Report domain types.

use chrono::NaiveDate;
use finnit_shared::types::CategoryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::TransactionType;

/// Months of history averaged for a cash-flow projection.
pub const HISTORY_MONTHS: u32 = 6;

/// Projection length used when the caller does not pick one.
pub const DEFAULT_PROJECTION_MONTHS: u32 = 6;

/// Longest projection, in months.
pub const MAX_PROJECTION_MONTHS: u32 = 120;

/// One ledger row as seen by the reports.
///
/// Only income and expense rows contribute; transfer legs and adjustments
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLine {
    /// Transaction type.
    pub kind: TransactionType,
    /// Category, if any.
    pub category_id: Option<CategoryId>,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Booking date.
    pub date: NaiveDate,
}

/// Spending in one category within a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryExpense {
    /// Category.
    pub category_id: CategoryId,
    /// Display name, `Unknown` when the category is gone.
    pub category_name: String,
    /// Total spent.
    pub amount: Decimal,
    /// Share of the month's expenses, two places.
    pub percentage: Decimal,
}

/// Income and expense totals for a calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Currency of the owner's first account.
    pub currency: String,
    /// Sum of income.
    pub total_income: Decimal,
    /// Sum of expenses.
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`.
    pub net_income: Decimal,
    /// Categorized expenses, largest first.
    pub category_breakdown: Vec<CategoryExpense>,
}

/// Average monthly income and expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthlyFlow {
    /// Average monthly income.
    pub income: Decimal,
    /// Average monthly expenses.
    pub expenses: Decimal,
}

impl MonthlyFlow {
    /// Income minus expenses.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.income - self.expenses
    }
}

/// Projected total balance at one month boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Projection date.
    pub date: NaiveDate,
    /// Balance expected on that date.
    pub projected_balance: Decimal,
    /// Label, e.g. `Month 3 projection`.
    pub description: String,
}

/// A hypothetical monthly budget to play forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfInput {
    /// Scenario label.
    pub scenario_name: String,
    /// Assumed monthly income.
    pub monthly_income: Decimal,
    /// Assumed monthly expenses.
    pub monthly_expenses: Decimal,
    /// Month zero of the projection.
    pub start_date: NaiveDate,
    /// Number of months to project.
    pub months_to_project: u32,
}

/// Outcome of a what-if scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfResult {
    /// Scenario label.
    pub scenario_name: String,
    /// Balance after each month.
    pub projections: Vec<ProjectionPoint>,
    /// Balance after the last month.
    pub final_balance: Decimal,
    /// `final_balance` minus the starting balance.
    pub total_savings: Decimal,
}
