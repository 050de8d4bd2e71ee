//! Transfer error types.

use finnit_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while planning a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Source and destination are the same account.
    #[error("Cannot transfer to the same account")]
    SameAccount,

    /// The accounts hold different currencies.
    #[error("Currency conversion not supported yet ({from} to {to})")]
    CurrencyMismatch {
        /// Source currency.
        from: String,
        /// Destination currency.
        to: String,
    },

    /// The source balance does not cover the amount.
    #[error("Insufficient balance in source account: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Current source balance.
        available: Decimal,
        /// Requested amount.
        requested: Decimal,
    },
}

impl TransferError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SameAccount => "TRANSFER_SAME_ACCOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::SameAccount => Self::TransferSameAccount(err.to_string()),
            TransferError::CurrencyMismatch { .. } => Self::Validation(err.to_string()),
            TransferError::InsufficientBalance { .. } => Self::InsufficientBalance(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            AppError::from(TransferError::SameAccount).error_code(),
            "TRANSFER_SAME_ACCOUNT"
        );
        assert_eq!(
            AppError::from(TransferError::CurrencyMismatch {
                from: "USD".into(),
                to: "EUR".into(),
            })
            .error_code(),
            "VALIDATION_ERROR"
        );
        let err = TransferError::InsufficientBalance {
            available: dec!(0),
            requested: dec!(1),
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
        assert_eq!(AppError::from(err).error_code(), "INSUFFICIENT_BALANCE");
    }
}
