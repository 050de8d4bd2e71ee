//! Domain types for ledger transactions.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money received.
    Income,
    /// Money spent.
    Expense,
    /// One leg of a transfer between two owned accounts.
    Transfer,
    /// Manual correction of an account balance.
    Adjustment,
}

impl TransactionType {
    /// Returns the direction implied by the type, if it is fixed.
    ///
    /// Income always flows in and expenses always flow out; transfer legs and
    /// adjustments carry an explicit direction.
    #[must_use]
    pub const fn implied_direction(self) -> Option<FlowDirection> {
        match self {
            Self::Income => Some(FlowDirection::Inflow),
            Self::Expense => Some(FlowDirection::Outflow),
            Self::Transfer | Self::Adjustment => None,
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            "adjustment" => Ok(Self::Adjustment),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// Whether a transaction adds to or subtracts from its account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    /// Adds to the account balance.
    Inflow,
    /// Subtracts from the account balance.
    Outflow,
}

impl FlowDirection {
    /// Applies the direction's sign to a positive magnitude.
    #[must_use]
    pub fn apply(self, amount: Decimal) -> Decimal {
        match self {
            Self::Inflow => amount,
            Self::Outflow => -amount,
        }
    }

    /// Direction that a signed amount represents (negative means outflow).
    #[must_use]
    pub fn of_signed(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            Self::Outflow
        } else {
            Self::Inflow
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionSource {
    /// Entered by the user; fully editable.
    Manual,
    /// Brought in by a bulk import; only category and description may change.
    Imported,
}

/// The balance-relevant projection of a stored transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Positive magnitude.
    pub amount: Decimal,
    /// Sign of the effect.
    pub direction: FlowDirection,
    /// Pending postings never touch the confirmed balance.
    pub is_pending: bool,
}

impl Posting {
    /// Creates a posting.
    #[must_use]
    pub const fn new(amount: Decimal, direction: FlowDirection, is_pending: bool) -> Self {
        Self {
            amount,
            direction,
            is_pending,
        }
    }

    /// Directional effect of the posting, ignoring the pending flag.
    #[must_use]
    pub fn signed_effect(&self) -> Decimal {
        self.direction.apply(self.amount)
    }

    /// Effect currently reflected in the account balance.
    #[must_use]
    pub fn applied_effect(&self) -> Decimal {
        if self.is_pending {
            Decimal::ZERO
        } else {
            self.signed_effect()
        }
    }
}

/// Records that block destructive edits of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkedRecords {
    /// The transaction is one leg of a transfer.
    pub is_transfer_leg: bool,
    /// A debt payment references the transaction.
    pub has_debt_payment: bool,
    /// At least one goal contribution references the transaction.
    pub has_goal_contributions: bool,
}

/// How far an amendment reaches into a transaction.
///
/// Ordered from least to most invasive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AmendScope {
    /// Category or description only.
    Labels,
    /// Date or merchant details; no balance effect.
    Details,
    /// Amount, type or direction; changes the balance effect.
    Posting,
}

/// Income, expense and count totals over a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    /// Sum of confirmed income.
    pub total_income: Decimal,
    /// Sum of confirmed expenses.
    pub total_expenses: Decimal,
    /// Income minus expenses.
    pub net_amount: Decimal,
    /// Number of non-transfer transactions in range.
    pub transaction_count: u64,
}
