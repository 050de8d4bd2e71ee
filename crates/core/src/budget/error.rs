//! Budget error types.

use finnit_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Budget-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// Year or month outside the supported calendar.
    #[error("Invalid budget period: {year}-{month:02}")]
    InvalidPeriod {
        /// Calendar year.
        year: i32,
        /// Calendar month (1-12).
        month: u32,
    },

    /// Caps and totals cannot be negative.
    #[error("Budget amounts cannot be negative")]
    NegativeAmount,

    /// A category appears twice in one budget.
    #[error("Category {0} is capped more than once")]
    DuplicateCategory(Uuid),

    /// Another budget already covers the period.
    #[error("Budget already exists for this month")]
    AlreadyExists,
}

impl BudgetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod { .. } => "INVALID_BUDGET_PERIOD",
            Self::NegativeAmount => "NEGATIVE_BUDGET_AMOUNT",
            Self::DuplicateCategory(_) => "DUPLICATE_BUDGET_CATEGORY",
            Self::AlreadyExists => "BUDGET_ALREADY_EXISTS",
        }
    }
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::AlreadyExists => Self::Conflict(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
