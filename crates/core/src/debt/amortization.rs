//! Amortization math for a single debt.
//!
//! All arithmetic is decimal; logarithms come from `rust_decimal`'s
//! `MathematicalOps`, never from `f64`.

use chrono::{Months, NaiveDate};
use finnit_shared::types::money::non_negative;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

use super::types::{DebtPosition, PayoffSchedule};

/// Months reported for a payment that never clears the balance.
pub const NEVER_PAYS_OFF_MONTHS: Decimal = Decimal::from_parts(999, 0, 0, false, 0);

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Converts an annual percentage rate into a monthly fraction.
///
/// `18.5` becomes `18.5 / 100 / 12`. No rate means no interest.
#[must_use]
pub fn monthly_rate(annual_percent: Option<Decimal>) -> Decimal {
    annual_percent.map_or(Decimal::ZERO, |annual| {
        annual / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR
    })
}

/// Fractional months needed to clear `balance` at `payment` per month.
///
/// Uses the annuity payoff formula `n = -ln(1 - b*r/p) / ln(1 + r)`, or
/// `b / p` without interest. Returns `None` when the payment never reduces
/// the principal.
#[must_use]
pub fn months_to_payoff(balance: Decimal, payment: Decimal, rate: Decimal) -> Option<Decimal> {
    if balance <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    if payment <= Decimal::ZERO {
        return None;
    }
    if rate.is_zero() {
        return balance.checked_div(payment);
    }
    if payment <= balance * rate {
        return None;
    }

    let remaining_fraction = Decimal::ONE - balance * rate / payment;
    let numerator = remaining_fraction.checked_ln()?;
    let denominator = (Decimal::ONE + rate).checked_ln()?;
    (-numerator).checked_div(denominator)
}

/// Adds `ceil(months)` calendar months to `today`.
#[must_use]
pub fn payoff_date(today: NaiveDate, months: Decimal) -> Option<NaiveDate> {
    let whole = months.ceil().to_u32()?;
    today.checked_add_months(Months::new(whole))
}

/// Projects paying off `debt` at a fixed monthly payment.
///
/// The payment falls back to the debt's minimum, then to zero. The result is a
/// pure function of its inputs.
#[must_use]
pub fn calculate_payoff_schedule(
    debt: &DebtPosition,
    monthly_payment: Option<Decimal>,
    today: NaiveDate,
) -> PayoffSchedule {
    let current_balance = debt.remaining();
    let payment = monthly_payment
        .or(debt.min_payment)
        .unwrap_or(Decimal::ZERO);

    if current_balance.is_zero() {
        return PayoffSchedule {
            current_balance,
            monthly_payment: payment,
            total_interest: Some(Decimal::ZERO),
            months_remaining: Decimal::ZERO,
            pays_off: true,
            payoff_date: Some(today),
        };
    }

    match months_to_payoff(current_balance, payment, debt.monthly_rate()) {
        Some(months) => PayoffSchedule {
            current_balance,
            monthly_payment: payment,
            total_interest: Some(non_negative(payment * months - current_balance).round_dp(2)),
            months_remaining: months,
            pays_off: true,
            payoff_date: payoff_date(today, months),
        },
        None => PayoffSchedule {
            current_balance,
            monthly_payment: payment,
            total_interest: None,
            months_remaining: NEVER_PAYS_OFF_MONTHS,
            pays_off: false,
            payoff_date: None,
        },
    }
}
