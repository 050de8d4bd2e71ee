//! Goal error types.

use finnit_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Goal-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalError {
    /// The goal already holds its target amount.
    #[error("Goal has already been reached")]
    AlreadyReached,

    /// Removing the contribution would leave a negative amount.
    #[error("Removing {applied} would make the goal amount negative (current {current})")]
    NegativeAmount {
        /// Amount the contribution added.
        applied: Decimal,
        /// Goal amount before removal.
        current: Decimal,
    },

    /// Goals with contributions keep their history.
    #[error("Cannot delete goal with existing contributions")]
    HasContributions,

    /// The saved amount may never exceed the target.
    #[error("Target amount ({target}) cannot be below the amount already saved ({current})")]
    TargetBelowSaved {
        /// Requested target.
        target: Decimal,
        /// Amount already saved.
        current: Decimal,
    },
}

impl GoalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyReached => "GOAL_ALREADY_REACHED",
            Self::NegativeAmount { .. } => "GOAL_NEGATIVE_AMOUNT",
            Self::HasContributions => "GOAL_HAS_CONTRIBUTIONS",
            Self::TargetBelowSaved { .. } => "GOAL_TARGET_BELOW_SAVED",
        }
    }
}

impl From<GoalError> for AppError {
    fn from(err: GoalError) -> Self {
        match err {
            GoalError::AlreadyReached => Self::GoalAlreadyReached(err.to_string()),
            GoalError::NegativeAmount { .. }
            | GoalError::HasContributions
            | GoalError::TargetBelowSaved { .. } => {
                Self::Validation(err.to_string())
            }
        }
    }
}
