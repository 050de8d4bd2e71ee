//! Ledger error types for transaction mutation rules.

use finnit_shared::AppError;
use thiserror::Error;

use super::types::{FlowDirection, TransactionType};

/// Errors raised when a transaction mutation breaks a ledger rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Source Errors ==========
    /// Imported transactions only accept category and description edits.
    #[error("Cannot modify imported transactions")]
    ImportedImmutable,

    /// Imported transactions cannot be deleted by the user.
    #[error("Cannot delete imported transactions")]
    ImportedUndeletable,

    // ========== Linked Record Errors ==========
    /// Transfer legs keep their amount and direction for the pair's lifetime.
    #[error("Cannot change the amount, type or direction of a transfer transaction")]
    TransferLegImmutable,

    /// Transfer legs are removed only together with their transfer.
    #[error("Cannot delete a transaction that is part of a transfer")]
    TransferLegUndeletable,

    /// A debt payment references the transaction.
    #[error("Cannot delete a transaction that is linked to a debt payment")]
    DebtPaymentLinked,

    /// Goal contributions reference the transaction.
    #[error("Cannot delete a transaction that has goal contributions")]
    GoalContributionsLinked,

    // ========== Shape Errors ==========
    /// Transaction currency differs from its account.
    #[error("Transaction currency {transaction} does not match account currency {account}")]
    CurrencyMismatch {
        /// Account currency code.
        account: String,
        /// Transaction currency code.
        transaction: String,
    },

    /// Transfers and adjustments need an explicit direction.
    #[error("Transactions of type {0} require an explicit direction")]
    DirectionRequired(TransactionType),

    /// Direction contradicts the type.
    #[error("Transactions of type {kind} cannot be {direction}")]
    DirectionMismatch {
        /// The transaction type.
        kind: TransactionType,
        /// The requested direction.
        direction: FlowDirection,
    },

    /// Transfer legs are created by the transfer orchestrator only.
    #[error("Transfer transactions must be created through a transfer")]
    TransferOutsideTransfer,

    /// A balance adjustment of zero changes nothing.
    #[error("Adjustment amount cannot be zero")]
    ZeroAdjustment,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ImportedImmutable => "IMPORTED_IMMUTABLE",
            Self::ImportedUndeletable => "IMPORTED_UNDELETABLE",
            Self::TransferLegImmutable => "TRANSFER_LEG_IMMUTABLE",
            Self::TransferLegUndeletable => "TRANSFER_LEG_UNDELETABLE",
            Self::DebtPaymentLinked => "DEBT_PAYMENT_LINKED",
            Self::GoalContributionsLinked => "GOAL_CONTRIBUTIONS_LINKED",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::DirectionRequired(_) => "DIRECTION_REQUIRED",
            Self::DirectionMismatch { .. } => "DIRECTION_MISMATCH",
            Self::TransferOutsideTransfer => "TRANSFER_OUTSIDE_TRANSFER",
            Self::ZeroAdjustment => "ZERO_ADJUSTMENT",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::ImportedImmutable.error_code(), "IMPORTED_IMMUTABLE");
        assert_eq!(
            LedgerError::CurrencyMismatch {
                account: "USD".into(),
                transaction: "EUR".into(),
            }
            .error_code(),
            "CURRENCY_MISMATCH"
        );
    }

    #[test]
    fn test_all_ledger_errors_are_validation() {
        let errors = [
            LedgerError::ImportedImmutable,
            LedgerError::TransferLegUndeletable,
            LedgerError::DebtPaymentLinked,
            LedgerError::GoalContributionsLinked,
            LedgerError::ZeroAdjustment,
        ];
        for err in errors {
            assert_eq!(AppError::from(err).error_code(), "VALIDATION_ERROR");
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LedgerError::DirectionMismatch {
                kind: TransactionType::Income,
                direction: FlowDirection::Outflow,
            }
            .to_string(),
            "Transactions of type income cannot be outflow"
        );
        assert_eq!(
            LedgerError::CurrencyMismatch {
                account: "USD".into(),
                transaction: "EUR".into(),
            }
            .to_string(),
            "Transaction currency EUR does not match account currency USD"
        );
    }
}
