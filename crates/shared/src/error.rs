//! Application-wide error types.
//!
//! Every failure that reaches a caller is one of these kinds. Business-rule
//! variants carry a human-readable message; storage failures carry only an
//! opaque reference that support can correlate with the server logs.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Entity absent or not owned by the caller.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Precondition violated.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique constraint violated (e.g., duplicate budget period).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transfer source lacks funds.
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Transfer source and destination are the same account.
    #[error("Invalid transfer: {0}")]
    TransferSameAccount(String),

    /// Spending would exceed a budget cap and the caller chose to enforce it.
    #[error("Budget exceeded: {0}")]
    BudgetExceeded(String),

    /// Goal already reached its target.
    #[error("Goal already reached: {0}")]
    GoalAlreadyReached(String),

    /// Debt payment exceeds the remaining balance.
    #[error("Debt overpayment: {0}")]
    DebtOverpayment(String),

    /// Storage-layer failure. The underlying cause is logged, never exposed.
    #[error("Internal error (reference {reference})")]
    Internal {
        /// Opaque reference for support correlation.
        reference: Uuid,
        /// Whether the caller may retry the operation unchanged.
        retryable: bool,
    },
}

impl AppError {
    /// Creates an internal error with a fresh support reference.
    #[must_use]
    pub fn internal(retryable: bool) -> Self {
        Self::Internal {
            reference: Uuid::now_v7(),
            retryable,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::InsufficientBalance(_)
            | Self::TransferSameAccount(_)
            | Self::BudgetExceeded(_)
            | Self::GoalAlreadyReached(_)
            | Self::DebtOverpayment(_) => 422,
            Self::Internal { retryable: true, .. } => 503,
            Self::Internal { retryable: false, .. } => 500,
        }
    }

    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::InsufficientBalance(_) => "INSUFFICIENT_BALANCE",
            Self::TransferSameAccount(_) => "TRANSFER_SAME_ACCOUNT",
            Self::BudgetExceeded(_) => "BUDGET_EXCEEDED",
            Self::GoalAlreadyReached(_) => "GOAL_ALREADY_REACHED",
            Self::DebtOverpayment(_) => "DEBT_OVERPAYMENT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller may retry the failed operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Internal { retryable: true, .. })
    }

    /// Returns the support reference for internal errors.
    #[must_use]
    pub const fn reference(&self) -> Option<Uuid> {
        match self {
            Self::Internal { reference, .. } => Some(*reference),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(AppError::InsufficientBalance(String::new()), 422, "INSUFFICIENT_BALANCE")]
    #[case(AppError::TransferSameAccount(String::new()), 422, "TRANSFER_SAME_ACCOUNT")]
    #[case(AppError::BudgetExceeded(String::new()), 422, "BUDGET_EXCEEDED")]
    #[case(AppError::GoalAlreadyReached(String::new()), 422, "GOAL_ALREADY_REACHED")]
    #[case(AppError::DebtOverpayment(String::new()), 422, "DEBT_OVERPAYMENT")]
    fn test_status_and_codes(
        #[case] err: AppError,
        #[case] status: u16,
        #[case] code: &'static str,
    ) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
        assert!(!err.is_retryable());
        assert!(err.reference().is_none());
    }

    #[test]
    fn test_internal_error_is_opaque() {
        let err = AppError::internal(false);
        let reference = err.reference().unwrap();

        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert_eq!(
            err.to_string(),
            format!("Internal error (reference {reference})")
        );
    }

    #[test]
    fn test_retryable_internal_error() {
        let err = AppError::internal(true);
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::NotFound("Account not found".into()).to_string(),
            "Not found: Account not found"
        );
        assert_eq!(
            AppError::DebtOverpayment("too much".into()).to_string(),
            "Debt overpayment: too much"
        );
    }
}
