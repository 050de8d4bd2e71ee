//! Budget data types.

use chrono::{Datelike, Months, NaiveDate};
use finnit_shared::AppResult;
use finnit_shared::types::CategoryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BudgetError;

/// A calendar month covered by one budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BudgetPeriod {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

impl BudgetPeriod {
    /// Creates a period, validating the month.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::InvalidPeriod` when the month is outside 1-12 or
    /// the year cannot be represented as a date.
    pub fn new(year: i32, month: u32) -> Result<Self, BudgetError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(BudgetError::InvalidPeriod { year, month });
        }
        Ok(Self { year, month })
    }

    /// The period containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First calendar day of the month.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::InvalidPeriod` for a period built without [`BudgetPeriod::new`].
    pub fn first_day(&self) -> Result<NaiveDate, BudgetError> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(BudgetError::InvalidPeriod {
            year: self.year,
            month: self.month,
        })
    }

    /// Last calendar day of the month.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::InvalidPeriod` for a period built without [`BudgetPeriod::new`].
    pub fn last_day(&self) -> Result<NaiveDate, BudgetError> {
        self.first_day()?
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(BudgetError::InvalidPeriod {
                year: self.year,
                month: self.month,
            })
    }

    /// Whether `date` falls inside the month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// A spending cap on one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCap {
    /// Capped category.
    pub category_id: CategoryId,
    /// Category display name.
    pub name: String,
    /// Maximum spend for the period.
    pub cap: Decimal,
}

/// A budget as seen by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetDefinition {
    /// Covered month.
    pub period: BudgetPeriod,
    /// Optional cap on all spending in the period.
    pub amount_total: Option<Decimal>,
    /// Per-category caps.
    pub caps: Vec<CategoryCap>,
}

/// One confirmed or pending expense considered for usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseLine {
    /// Category, if tagged.
    pub category_id: Option<CategoryId>,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Transaction date.
    pub date: NaiveDate,
}

/// Spend against one category cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUsage {
    /// Category.
    pub category_id: CategoryId,
    /// Category display name.
    pub name: String,
    /// Cap for the period.
    pub budgeted: Decimal,
    /// Spent in the period.
    pub spent: Decimal,
    /// Cap minus spend; negative when over.
    pub remaining: Decimal,
    /// `100 * spent / budgeted`, two places.
    pub utilization_percentage: Decimal,
    /// Utilization strictly above 100.
    pub is_over_budget: bool,
}

/// Spend against a whole budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetUsage {
    /// Covered month.
    pub period: BudgetPeriod,
    /// The total cap, when one is set.
    pub total_budget: Option<Decimal>,
    /// All expenses in the window, regardless of category.
    pub total_spent: Decimal,
    /// Total cap minus spend, when a total cap is set.
    pub remaining_budget: Option<Decimal>,
    /// Total utilization, when a total cap is set.
    pub utilization_percentage: Option<Decimal>,
    /// Per-category usage in cap order.
    pub categories: Vec<CategoryUsage>,
}

/// How urgent a budget alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Below 90% used.
    Low,
    /// 90% up to 100% used.
    Medium,
    /// A category cap reached or exceeded.
    High,
    /// The total cap reached or exceeded.
    Critical,
}

/// What an alert is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum AlertScope {
    /// A single category cap.
    Category {
        /// Category.
        category_id: CategoryId,
        /// Category display name.
        name: String,
    },
    /// The budget's total cap.
    Total,
}

/// A threshold crossing on one cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAlert {
    /// Category or total.
    pub scope: AlertScope,
    /// Cap.
    pub budgeted: Decimal,
    /// Spend.
    pub spent: Decimal,
    /// Utilization percentage.
    pub percentage: Decimal,
    /// Urgency.
    pub severity: AlertSeverity,
    /// Human-readable explanation.
    pub message: String,
}

/// Result of the advisory pre-transaction check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCheck {
    /// False when the projected spend would exceed the cap.
    pub allowed: bool,
    /// Soft or hard warning for the caller to surface.
    pub warning: Option<String>,
}

impl BudgetCheck {
    /// No cap applies.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            allowed: true,
            warning: None,
        }
    }

    /// Turns a refusal into an error for callers that block on budgets.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BudgetExceeded` when the check did not allow the spend.
    pub fn enforce(self) -> AppResult<Self> {
        if self.allowed {
            Ok(self)
        } else {
            Err(finnit_shared::AppError::BudgetExceeded(
                self.warning
                    .unwrap_or_else(|| "Budget exceeded".to_string()),
            ))
        }
    }
}

/// Month overview across all category caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// Covered month.
    pub period: BudgetPeriod,
    /// Sum of category caps.
    pub total_budgeted: Decimal,
    /// All expenses in the window.
    pub total_spent: Decimal,
    /// Budgeted minus spent.
    pub total_remaining: Decimal,
    /// Spent as a percentage of budgeted.
    pub overall_percentage: Decimal,
    /// Number of category caps.
    pub category_count: usize,
    /// Categories above 100%.
    pub categories_over_budget: usize,
    /// Categories between 80% and 100% inclusive.
    pub categories_near_budget: usize,
    /// Per-category usage.
    pub categories: Vec<CategoryUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2026, 2, 28)]
    #[case(2024, 2, 29)]
    #[case(2026, 12, 31)]
    #[case(2026, 4, 30)]
    fn test_period_bounds(#[case] year: i32, #[case] month: u32, #[case] last: u32) {
        let period = BudgetPeriod::new(year, month).unwrap();
        assert_eq!(period.first_day().unwrap(), NaiveDate::from_ymd_opt(year, month, 1).unwrap());
        assert_eq!(period.last_day().unwrap(), NaiveDate::from_ymd_opt(year, month, last).unwrap());
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert_eq!(
            BudgetPeriod::new(2026, 13),
            Err(BudgetError::InvalidPeriod { year: 2026, month: 13 })
        );
        assert!(BudgetPeriod::new(2026, 0).is_err());
    }

    #[test]
    fn test_contains() {
        let period = BudgetPeriod::new(2026, 3).unwrap();
        assert!(period.contains(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
        assert_eq!(
            BudgetPeriod::containing(NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()),
            period
        );
    }
}
