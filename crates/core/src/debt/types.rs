//! Debt domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use finnit_shared::types::DebtId;
use finnit_shared::types::money::non_negative;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amortization::monthly_rate;

/// What kind of borrowing a debt is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    /// Credit card balance.
    Card,
    /// Personal or auto loan.
    Loan,
    /// Mortgage.
    Mortgage,
    /// Buy-now-pay-later plan.
    Paylater,
    /// Anything else.
    Other,
}

impl DebtKind {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Loan => "loan",
            Self::Mortgage => "mortgage",
            Self::Paylater => "paylater",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DebtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebtKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "loan" => Ok(Self::Loan),
            "mortgage" => Ok(Self::Mortgage),
            "paylater" => Ok(Self::Paylater),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown debt kind: {s}")),
        }
    }
}

/// Multi-debt payoff ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffStrategy {
    /// Highest interest rate first.
    Avalanche,
    /// Lowest remaining balance first.
    Snowball,
}

/// A debt together with what has been paid against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtPosition {
    /// Debt.
    pub id: DebtId,
    /// Display name.
    pub name: String,
    /// Amount originally financed.
    pub principal: Decimal,
    /// Sum of recorded payments.
    pub total_paid: Decimal,
    /// Annual interest rate in percent.
    pub interest_rate_annual: Option<Decimal>,
    /// Minimum monthly payment.
    pub min_payment: Option<Decimal>,
}

impl DebtPosition {
    /// `max(0, principal - total_paid)`.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        non_negative(self.principal - self.total_paid)
    }

    /// Monthly interest rate as a fraction.
    #[must_use]
    pub fn monthly_rate(&self) -> Decimal {
        monthly_rate(self.interest_rate_annual)
    }

    /// Minimum payment, zero when unset.
    #[must_use]
    pub fn min_payment_or_zero(&self) -> Decimal {
        self.min_payment.unwrap_or(Decimal::ZERO)
    }
}

/// Projection of paying off one debt at a fixed monthly payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffSchedule {
    /// Remaining balance today.
    pub current_balance: Decimal,
    /// Payment assumed each month.
    pub monthly_payment: Decimal,
    /// Interest paid over the schedule; `None` when it never pays off.
    pub total_interest: Option<Decimal>,
    /// Fractional months until paid off, or the never-pays-off sentinel.
    pub months_remaining: Decimal,
    /// False when the payment never reduces the balance.
    pub pays_off: bool,
    /// Month the debt is cleared; `None` when it never pays off.
    pub payoff_date: Option<NaiveDate>,
}

/// A payoff schedule labelled with its debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtProjection {
    /// Debt.
    pub debt_id: DebtId,
    /// Display name.
    pub debt_name: String,
    /// Projection.
    pub schedule: PayoffSchedule,
}

/// Totals across all of an owner's debts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtSummary {
    /// Sum of principals.
    pub total_principal: Decimal,
    /// Sum of payments.
    pub total_paid: Decimal,
    /// Sum of remaining balances.
    pub total_remaining: Decimal,
    /// Sum of minimum payments.
    pub total_monthly_payments: Decimal,
    /// Projections at minimum payment, earliest payoff first.
    pub projections: Vec<DebtProjection>,
}
