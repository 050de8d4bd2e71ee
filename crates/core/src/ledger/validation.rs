//! Business rule validation for ledger transactions.

use finnit_shared::types::Currency;

use super::error::LedgerError;
use super::types::{AmendScope, FlowDirection, LinkedRecords, TransactionSource, TransactionType};

/// Resolves the direction of a transaction from its type and the request.
///
/// # Errors
///
/// Returns `DirectionRequired` when a transfer or adjustment omits it, and
/// `DirectionMismatch` when income or expense asks for the wrong sign.
pub fn resolve_direction(
    kind: TransactionType,
    requested: Option<FlowDirection>,
) -> Result<FlowDirection, LedgerError> {
    match (kind.implied_direction(), requested) {
        (Some(implied), None) => Ok(implied),
        (Some(implied), Some(direction)) if implied == direction => Ok(direction),
        (Some(_), Some(direction)) => Err(LedgerError::DirectionMismatch { kind, direction }),
        (None, Some(direction)) => Ok(direction),
        (None, None) => Err(LedgerError::DirectionRequired(kind)),
    }
}

/// Validates that a transaction is denominated in its account's currency.
///
/// # Errors
///
/// Returns `CurrencyMismatch` otherwise.
pub fn ensure_currency_matches(account: &Currency, transaction: &Currency) -> Result<(), LedgerError> {
    if account == transaction {
        Ok(())
    } else {
        Err(LedgerError::CurrencyMismatch {
            account: account.to_string(),
            transaction: transaction.to_string(),
        })
    }
}

/// Validates that an amendment of the given scope is allowed.
///
/// Imported rows accept label edits only. Transfer legs never change their
/// balance effect because the opposite leg would drift out of step.
///
/// # Errors
///
/// Returns `ImportedImmutable` or `TransferLegImmutable`.
pub fn ensure_amendable(
    source: TransactionSource,
    links: &LinkedRecords,
    scope: AmendScope,
) -> Result<(), LedgerError> {
    if source == TransactionSource::Imported && scope > AmendScope::Labels {
        return Err(LedgerError::ImportedImmutable);
    }
    if links.is_transfer_leg && scope == AmendScope::Posting {
        return Err(LedgerError::TransferLegImmutable);
    }
    Ok(())
}

/// Validates that a transaction may be deleted.
///
/// # Errors
///
/// Returns the first blocking rule: imported source, transfer leg, debt
/// payment, then goal contributions.
pub fn ensure_deletable(source: TransactionSource, links: &LinkedRecords) -> Result<(), LedgerError> {
    if source == TransactionSource::Imported {
        return Err(LedgerError::ImportedUndeletable);
    }
    if links.is_transfer_leg {
        return Err(LedgerError::TransferLegUndeletable);
    }
    if links.has_debt_payment {
        return Err(LedgerError::DebtPaymentLinked);
    }
    if links.has_goal_contributions {
        return Err(LedgerError::GoalContributionsLinked);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TransactionType::Income, None, FlowDirection::Inflow)]
    #[case(TransactionType::Expense, None, FlowDirection::Outflow)]
    #[case(TransactionType::Expense, Some(FlowDirection::Outflow), FlowDirection::Outflow)]
    #[case(TransactionType::Adjustment, Some(FlowDirection::Outflow), FlowDirection::Outflow)]
    #[case(TransactionType::Transfer, Some(FlowDirection::Inflow), FlowDirection::Inflow)]
    fn test_resolve_direction(
        #[case] kind: TransactionType,
        #[case] requested: Option<FlowDirection>,
        #[case] expected: FlowDirection,
    ) {
        assert_eq!(resolve_direction(kind, requested).unwrap(), expected);
    }

    #[test]
    fn test_resolve_direction_errors() {
        assert_eq!(
            resolve_direction(TransactionType::Adjustment, None),
            Err(LedgerError::DirectionRequired(TransactionType::Adjustment))
        );
        assert!(matches!(
            resolve_direction(TransactionType::Income, Some(FlowDirection::Outflow)),
            Err(LedgerError::DirectionMismatch { .. })
        ));
    }

    #[test]
    fn test_currency_must_match() {
        let usd: Currency = "USD".parse().unwrap();
        let eur: Currency = "EUR".parse().unwrap();
        assert!(ensure_currency_matches(&usd, &usd).is_ok());
        assert!(matches!(
            ensure_currency_matches(&usd, &eur),
            Err(LedgerError::CurrencyMismatch { .. })
        ));
    }

    #[rstest]
    #[case(TransactionSource::Manual, false, AmendScope::Posting, true)]
    #[case(TransactionSource::Imported, false, AmendScope::Labels, true)]
    #[case(TransactionSource::Imported, false, AmendScope::Details, false)]
    #[case(TransactionSource::Imported, false, AmendScope::Posting, false)]
    #[case(TransactionSource::Manual, true, AmendScope::Details, true)]
    #[case(TransactionSource::Manual, true, AmendScope::Posting, false)]
    fn test_ensure_amendable(
        #[case] source: TransactionSource,
        #[case] is_transfer_leg: bool,
        #[case] scope: AmendScope,
        #[case] allowed: bool,
    ) {
        let links = LinkedRecords {
            is_transfer_leg,
            ..LinkedRecords::default()
        };
        assert_eq!(ensure_amendable(source, &links, scope).is_ok(), allowed);
    }

    #[test]
    fn test_ensure_deletable() {
        let clean = LinkedRecords::default();
        assert!(ensure_deletable(TransactionSource::Manual, &clean).is_ok());
        assert_eq!(
            ensure_deletable(TransactionSource::Imported, &clean),
            Err(LedgerError::ImportedUndeletable)
        );

        let leg = LinkedRecords {
            is_transfer_leg: true,
            ..clean
        };
        assert_eq!(
            ensure_deletable(TransactionSource::Manual, &leg),
            Err(LedgerError::TransferLegUndeletable)
        );

        let paid = LinkedRecords {
            has_debt_payment: true,
            ..clean
        };
        assert_eq!(
            ensure_deletable(TransactionSource::Manual, &paid),
            Err(LedgerError::DebtPaymentLinked)
        );

        let saved = LinkedRecords {
            has_goal_contributions: true,
            ..clean
        };
        assert_eq!(
            ensure_deletable(TransactionSource::Manual, &saved),
            Err(LedgerError::GoalContributionsLinked)
        );
    }
}
