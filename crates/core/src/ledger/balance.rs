//! Account balance deltas.
//!
//! `balance_current` is a materialized projection of the ledger: it changes
//! only by the delta of the event that justifies it, and it must always equal
//! [`replay`] over the account's surviving postings.

use rust_decimal::Decimal;

use super::types::{Posting, TransactionSummary, TransactionType};

/// A transaction-affecting event on one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceEvent {
    /// A new transaction was posted.
    Created(Posting),
    /// An existing transaction changed amount, type or direction.
    Amended {
        /// Posting as previously applied.
        before: Posting,
        /// Posting after the amendment.
        after: Posting,
    },
    /// A transaction was removed.
    Deleted(Posting),
    /// The pending flag changed.
    PendingChanged {
        /// Posting before the toggle.
        posting: Posting,
        /// New value of the pending flag.
        is_pending: bool,
    },
}

impl BalanceEvent {
    /// Signed amount to add to the account's `balance_current`.
    #[must_use]
    pub fn delta(&self) -> Decimal {
        match self {
            Self::Created(posting) => posting.applied_effect(),
            Self::Amended { before, after } => after.applied_effect() - before.applied_effect(),
            Self::Deleted(posting) => -posting.applied_effect(),
            Self::PendingChanged {
                posting,
                is_pending,
            } => match (posting.is_pending, *is_pending) {
                (true, false) => posting.signed_effect(),
                (false, true) => -posting.signed_effect(),
                _ => Decimal::ZERO,
            },
        }
    }
}

/// Recomputes a balance from scratch: the sum of confirmed signed effects.
#[must_use]
pub fn replay<'a, I>(postings: I) -> Decimal
where
    I: IntoIterator<Item = &'a Posting>,
{
    postings.into_iter().map(Posting::applied_effect).sum()
}

/// Totals income and expenses over confirmed postings.
///
/// Transfers and adjustments move money between buckets rather than earning
/// or spending it, so they stay out of both totals; transfers are also left
/// out of the count.
#[must_use]
pub fn summarize<'a, I>(lines: I) -> TransactionSummary
where
    I: IntoIterator<Item = (TransactionType, &'a Posting)>,
{
    let mut summary = TransactionSummary::default();

    for (kind, posting) in lines {
        if kind != TransactionType::Transfer {
            summary.transaction_count += 1;
        }
        if posting.is_pending {
            continue;
        }
        match kind {
            TransactionType::Income => summary.total_income += posting.amount,
            TransactionType::Expense => summary.total_expenses += posting.amount,
            TransactionType::Transfer | TransactionType::Adjustment => {}
        }
    }

    summary.net_amount = summary.total_income - summary.total_expenses;
    summary
}
