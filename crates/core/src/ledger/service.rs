//! Ledger service: validates transaction mutations and computes balance deltas.
//!
//! Callers persist the returned posting and apply the returned delta to the
//! account inside one unit of work. Nothing here touches storage.

use finnit_shared::AppResult;
use finnit_shared::types::Currency;
use finnit_shared::types::money::validate_amount;
use rust_decimal::Decimal;

use super::balance::BalanceEvent;
use super::error::LedgerError;
use super::types::{
    AmendScope, FlowDirection, LinkedRecords, Posting, TransactionSource, TransactionType,
};
use super::validation::{
    ensure_amendable, ensure_currency_matches, ensure_deletable, resolve_direction,
};

/// Requested changes to an existing transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Amendment {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New type.
    pub kind: Option<TransactionType>,
    /// New direction (adjustments only; other types imply theirs).
    pub direction: Option<FlowDirection>,
    /// Date or merchant changes.
    pub touches_details: bool,
}

impl Amendment {
    /// The most invasive part of the amendment.
    #[must_use]
    pub fn scope(&self) -> AmendScope {
        if self.amount.is_some() || self.kind.is_some() || self.direction.is_some() {
            AmendScope::Posting
        } else if self.touches_details {
            AmendScope::Details
        } else {
            AmendScope::Labels
        }
    }
}

/// Outcome of a validated amendment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmendedPosting {
    /// Type after the amendment.
    pub kind: TransactionType,
    /// Posting after the amendment.
    pub posting: Posting,
    /// Signed change to apply to the account balance.
    pub delta: Decimal,
}

/// Ledger service for transaction validation and delta computation.
pub struct LedgerService;

impl LedgerService {
    /// Validates a new user-entered transaction and returns its posting.
    ///
    /// Transfer legs are rejected here; they come only from the transfer
    /// orchestrator, which creates both legs together.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad amount, a direction that conflicts
    /// with the type, or a currency that differs from the account.
    pub fn prepare_create(
        kind: TransactionType,
        amount: Decimal,
        direction: Option<FlowDirection>,
        account_currency: &Currency,
        currency: &Currency,
        is_pending: bool,
    ) -> AppResult<Posting> {
        if kind == TransactionType::Transfer {
            return Err(LedgerError::TransferOutsideTransfer.into());
        }
        let amount = validate_amount(amount)?;
        let direction = resolve_direction(kind, direction)?;
        ensure_currency_matches(account_currency, currency)?;

        Ok(Posting::new(amount, direction, is_pending))
    }

    /// Validates an amendment and computes the balance delta it causes.
    ///
    /// The pending flag is preserved; toggling it goes through
    /// [`LedgerService::pending_delta`].
    ///
    /// # Errors
    ///
    /// Returns a validation error when the source or linked records forbid the
    /// change, the new amount is invalid, or the new direction is inconsistent.
    pub fn prepare_amendment(
        current_kind: TransactionType,
        current: Posting,
        source: TransactionSource,
        links: &LinkedRecords,
        amendment: &Amendment,
    ) -> AppResult<AmendedPosting> {
        ensure_amendable(source, links, amendment.scope())?;

        let kind = amendment.kind.unwrap_or(current_kind);
        if kind == TransactionType::Transfer && current_kind != TransactionType::Transfer {
            return Err(LedgerError::TransferOutsideTransfer.into());
        }

        let amount = match amendment.amount {
            Some(amount) => validate_amount(amount)?,
            None => current.amount,
        };

        let requested = amendment
            .direction
            .or_else(|| kind.implied_direction())
            .or(Some(current.direction));
        let direction = resolve_direction(kind, requested)?;

        let posting = Posting::new(amount, direction, current.is_pending);
        let delta = BalanceEvent::Amended {
            before: current,
            after: posting,
        }
        .delta();

        Ok(AmendedPosting {
            kind,
            posting,
            delta,
        })
    }

    /// Validates a deletion and returns the delta that reverses the posting.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the transaction is imported or linked to a
    /// transfer, debt payment or goal contribution.
    pub fn prepare_delete(
        posting: Posting,
        source: TransactionSource,
        links: &LinkedRecords,
    ) -> AppResult<Decimal> {
        ensure_deletable(source, links)?;
        Ok(BalanceEvent::Deleted(posting).delta())
    }

    /// Delta caused by setting the pending flag to `is_pending`.
    #[must_use]
    pub fn pending_delta(posting: Posting, is_pending: bool) -> Decimal {
        BalanceEvent::PendingChanged {
            posting,
            is_pending,
        }
        .delta()
    }

    /// Builds the adjustment posting for a signed balance correction.
    ///
    /// The stored amount is the magnitude; the sign lives in the direction.
    ///
    /// # Errors
    ///
    /// Returns a validation error for zero or sub-cent corrections.
    pub fn prepare_adjustment(signed_amount: Decimal) -> AppResult<Posting> {
        if signed_amount.is_zero() {
            return Err(LedgerError::ZeroAdjustment.into());
        }
        let amount = validate_amount(signed_amount.abs())?;
        Ok(Posting::new(
            amount,
            FlowDirection::of_signed(signed_amount),
            false,
        ))
    }

    /// The opening transaction for an account created with a non-zero balance.
    ///
    /// A positive opening balance is booked as income and a negative one (for
    /// example a credit card already in use) as an expense.
    ///
    /// # Errors
    ///
    /// Returns a validation error for sub-cent opening balances.
    pub fn opening_posting(initial_balance: Decimal) -> AppResult<Option<(TransactionType, Posting)>> {
        if initial_balance.is_zero() {
            return Ok(None);
        }
        let amount = validate_amount(initial_balance.abs())?;
        let kind = if initial_balance.is_sign_negative() {
            TransactionType::Expense
        } else {
            TransactionType::Income
        };
        let direction = resolve_direction(kind, None)?;
        Ok(Some((kind, Posting::new(amount, direction, false))))
    }
}
