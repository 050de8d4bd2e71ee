//! Transfer planning: preconditions and the two legs of a transfer.
//!
//! The planner is pure. The store re-reads both accounts under row locks and
//! calls [`TransferPlanner::plan`] again before writing, so the balance check
//! always runs against the locked value.

use finnit_shared::AppResult;
use finnit_shared::types::money::validate_amount;
use finnit_shared::types::{AccountId, Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::TransferError;
use crate::ledger::{FlowDirection, Posting};

/// The fields of an account the planner needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// Account.
    pub id: AccountId,
    /// Display name, used in the default description.
    pub name: String,
    /// Account currency.
    pub currency: Currency,
    /// Confirmed balance.
    pub balance: Decimal,
}

/// One side of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLeg {
    /// Account the leg posts to.
    pub account_id: AccountId,
    /// Leg description, suffixed with its side.
    pub description: String,
    /// Balance-relevant projection of the leg.
    pub posting: Posting,
}

impl TransferLeg {
    /// Signed change to the leg's account balance.
    #[must_use]
    pub fn delta(&self) -> Decimal {
        self.posting.applied_effect()
    }
}

/// A validated transfer, ready to be written atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlan {
    /// Amount moved.
    pub amount: Decimal,
    /// Shared currency of both accounts.
    pub currency: Currency,
    /// Description before side suffixes.
    pub description: String,
    /// Leg on the source account.
    pub outgoing: TransferLeg,
    /// Leg on the destination account.
    pub incoming: TransferLeg,
}

impl TransferPlan {
    /// Account ids in the order their rows must be locked.
    #[must_use]
    pub fn lock_order(&self) -> [AccountId; 2] {
        lock_order(self.outgoing.account_id, self.incoming.account_id)
    }
}

/// Orders two accounts so concurrent transfers lock rows consistently.
#[must_use]
pub fn lock_order(a: AccountId, b: AccountId) -> [AccountId; 2] {
    if a <= b { [a, b] } else { [b, a] }
}

/// Transfer planner.
pub struct TransferPlanner;

impl TransferPlanner {
    /// Rejects transfers from an account to itself.
    ///
    /// Runs before the accounts are loaded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::TransferSameAccount`.
    pub fn ensure_distinct(from: AccountId, to: AccountId) -> AppResult<()> {
        if from == to {
            return Err(TransferError::SameAccount.into());
        }
        Ok(())
    }

    /// Checks the remaining preconditions and builds both legs.
    ///
    /// Order: distinct accounts, matching currency, sufficient balance, then a
    /// valid amount.
    ///
    /// # Errors
    ///
    /// Returns `TransferSameAccount`, `Validation` for a currency mismatch or a
    /// bad amount, or `InsufficientBalance`.
    pub fn plan(
        from: &AccountSnapshot,
        to: &AccountSnapshot,
        amount: Decimal,
        description: Option<&str>,
    ) -> AppResult<TransferPlan> {
        Self::ensure_distinct(from.id, to.id)?;

        if from.currency != to.currency {
            return Err(TransferError::CurrencyMismatch {
                from: from.currency.to_string(),
                to: to.currency.to_string(),
            }
            .into());
        }

        if from.balance < amount {
            return Err(TransferError::InsufficientBalance {
                available: from.balance,
                requested: amount,
            }
            .into());
        }

        let amount = validate_amount(amount)?;

        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map_or_else(|| format!("Transfer to {}", to.name), str::to_string);

        Ok(TransferPlan {
            amount,
            currency: from.currency.clone(),
            outgoing: TransferLeg {
                account_id: from.id,
                description: format!("{description} (outgoing)"),
                posting: Posting::new(amount, FlowDirection::Outflow, false),
            },
            incoming: TransferLeg {
                account_id: to.id,
                description: format!("{description} (incoming)"),
                posting: Posting::new(amount, FlowDirection::Inflow, false),
            },
            description,
        })
    }
}
