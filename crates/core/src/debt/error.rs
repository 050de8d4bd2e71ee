//! Debt error types.

use finnit_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Debt-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebtError {
    /// Payment larger than what is still owed.
    #[error("Payment amount ({amount}) exceeds remaining debt balance ({remaining})")]
    Overpayment {
        /// Requested payment.
        amount: Decimal,
        /// Remaining balance.
        remaining: Decimal,
    },

    /// Debts with recorded payments keep their history.
    #[error("Cannot delete debt with existing payments")]
    HasPayments,

    /// Interest rates are annual percentages and cannot be negative.
    #[error("Interest rate cannot be negative")]
    NegativeRate,
}

impl DebtError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Overpayment { .. } => "DEBT_OVERPAYMENT",
            Self::HasPayments => "DEBT_HAS_PAYMENTS",
            Self::NegativeRate => "NEGATIVE_INTEREST_RATE",
        }
    }
}

impl From<DebtError> for AppError {
    fn from(err: DebtError) -> Self {
        match err {
            DebtError::Overpayment { .. } => Self::DebtOverpayment(err.to_string()),
            DebtError::HasPayments | DebtError::NegativeRate => Self::Validation(err.to_string()),
        }
    }
}
