//! Debt service: payment rules, multi-debt strategies and summaries.

use chrono::NaiveDate;
use finnit_shared::AppResult;
use finnit_shared::types::money::validate_amount;
use rust_decimal::Decimal;

use super::amortization::calculate_payoff_schedule;
use super::error::DebtError;
use super::types::{DebtPosition, DebtProjection, DebtSummary, PayoffStrategy};

/// Debt service for business logic.
pub struct DebtService;

impl DebtService {
    /// Validates the terms of a new or updated debt.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive principal, a negative
    /// rate or an invalid minimum payment.
    pub fn validate_terms(
        principal: Decimal,
        interest_rate_annual: Option<Decimal>,
        min_payment: Option<Decimal>,
    ) -> AppResult<()> {
        validate_amount(principal)?;
        if interest_rate_annual.is_some_and(|rate| rate < Decimal::ZERO) {
            return Err(DebtError::NegativeRate.into());
        }
        if let Some(min) = min_payment {
            validate_amount(min)?;
        }
        Ok(())
    }

    /// Checks a payment against what is still owed.
    ///
    /// Overpayments are rejected, never clamped.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad amount and `DebtOverpayment` when the
    /// amount exceeds the remaining balance.
    pub fn ensure_payment_allowed(debt: &DebtPosition, amount: Decimal) -> AppResult<Decimal> {
        let amount = validate_amount(amount)?;
        let remaining = debt.remaining();
        if amount > remaining {
            return Err(DebtError::Overpayment { amount, remaining }.into());
        }
        Ok(amount)
    }

    /// Validates that a debt can be deleted.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when payments are recorded against it.
    pub fn ensure_deletable(payment_count: u64) -> AppResult<()> {
        if payment_count > 0 {
            return Err(DebtError::HasPayments.into());
        }
        Ok(())
    }

    /// Orders debts for a payoff strategy; ties break by id.
    #[must_use]
    pub fn order(debts: &[DebtPosition], strategy: PayoffStrategy) -> Vec<&DebtPosition> {
        let mut ordered: Vec<&DebtPosition> = debts
            .iter()
            .filter(|debt| debt.remaining() > Decimal::ZERO)
            .collect();

        match strategy {
            PayoffStrategy::Avalanche => ordered.sort_by(|a, b| {
                b.monthly_rate()
                    .cmp(&a.monthly_rate())
                    .then_with(|| a.id.cmp(&b.id))
            }),
            PayoffStrategy::Snowball => ordered.sort_by(|a, b| {
                a.remaining()
                    .cmp(&b.remaining())
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
        ordered
    }

    /// Projects paying off several debts with a cascading extra payment.
    ///
    /// The extra goes entirely to the first debt in strategy order. Once a
    /// debt is projected, its minimum payment rolls into the extra for the
    /// next one.
    #[must_use]
    pub fn calculate_payoff_strategy(
        debts: &[DebtPosition],
        extra_payment: Decimal,
        strategy: PayoffStrategy,
        today: NaiveDate,
    ) -> Vec<DebtProjection> {
        let mut rolling_extra = extra_payment.max(Decimal::ZERO);

        Self::order(debts, strategy)
            .into_iter()
            .map(|debt| {
                let minimum = debt.min_payment_or_zero();
                let schedule =
                    calculate_payoff_schedule(debt, Some(minimum + rolling_extra), today);
                rolling_extra += minimum;
                DebtProjection {
                    debt_id: debt.id,
                    debt_name: debt.name.clone(),
                    schedule,
                }
            })
            .collect()
    }

    /// Totals and minimum-payment projections across all debts.
    ///
    /// Only debts with a balance and a minimum payment are projected; the
    /// projections are sorted by payoff date, never-paying debts last.
    #[must_use]
    pub fn summary(debts: &[DebtPosition], today: NaiveDate) -> DebtSummary {
        let mut projections: Vec<DebtProjection> = debts
            .iter()
            .filter(|debt| debt.remaining() > Decimal::ZERO && debt.min_payment_or_zero() > Decimal::ZERO)
            .map(|debt| DebtProjection {
                debt_id: debt.id,
                debt_name: debt.name.clone(),
                schedule: calculate_payoff_schedule(debt, None, today),
            })
            .collect();

        projections.sort_by(|a, b| {
            match (a.schedule.payoff_date, b.schedule.payoff_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then_with(|| a.debt_id.cmp(&b.debt_id))
        });

        DebtSummary {
            total_principal: debts.iter().map(|debt| debt.principal).sum(),
            total_paid: debts.iter().map(|debt| debt.total_paid).sum(),
            total_remaining: debts.iter().map(DebtPosition::remaining).sum(),
            total_monthly_payments: debts.iter().map(DebtPosition::min_payment_or_zero).sum(),
            projections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finnit_shared::AppError;
    use finnit_shared::types::DebtId;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    fn debt(name: &str, principal: Decimal, rate: Decimal, min: Decimal) -> DebtPosition {
        DebtPosition {
            id: DebtId::new(),
            name: name.to_string(),
            principal,
            total_paid: Decimal::ZERO,
            interest_rate_annual: Some(rate),
            min_payment: Some(min),
        }
    }

    #[test]
    fn test_payment_rules() {
        let mut card = debt("Card", dec!(5000), dec!(18.5), dec!(150));
        assert_eq!(
            DebtService::ensure_payment_allowed(&card, dec!(5000)).unwrap(),
            dec!(5000)
        );

        card.total_paid = dec!(5000);
        assert_eq!(card.remaining(), Decimal::ZERO);
        assert!(matches!(
            DebtService::ensure_payment_allowed(&card, dec!(1)),
            Err(AppError::DebtOverpayment(_))
        ));
        assert!(matches!(
            DebtService::ensure_payment_allowed(&card, dec!(-1)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_terms() {
        assert!(DebtService::validate_terms(dec!(100), Some(dec!(5)), Some(dec!(10))).is_ok());
        assert!(DebtService::validate_terms(dec!(100), None, None).is_ok());
        assert!(DebtService::validate_terms(dec!(0), None, None).is_err());
        assert!(DebtService::validate_terms(dec!(100), Some(dec!(-1)), None).is_err());
        assert!(DebtService::validate_terms(dec!(100), None, Some(dec!(0))).is_err());
    }

    #[test]
    fn test_ensure_deletable() {
        assert!(DebtService::ensure_deletable(0).is_ok());
        assert!(matches!(
            DebtService::ensure_deletable(2),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_avalanche_orders_by_rate() {
        let low = debt("Loan", dec!(1000), dec!(5), dec!(50));
        let high = debt("Card", dec!(3000), dec!(24), dec!(90));
        let debts = [low.clone(), high.clone()];

        let ordered = DebtService::order(&debts, PayoffStrategy::Avalanche);
        assert_eq!(ordered[0].id, high.id);

        let ordered = DebtService::order(&debts, PayoffStrategy::Snowball);
        assert_eq!(ordered[0].id, low.id);
    }

    #[test]
    fn test_strategy_cascades_minimums() {
        let small = debt("Store card", dec!(500), dec!(20), dec!(25));
        let big = debt("Car", dec!(8000), dec!(6), dec!(200));
        let mut paid = debt("Old loan", dec!(100), dec!(10), dec!(10));
        paid.total_paid = dec!(100);

        let projections = DebtService::calculate_payoff_strategy(
            &[big.clone(), small.clone(), paid],
            dec!(100),
            PayoffStrategy::Snowball,
            today(),
        );

        assert_eq!(projections.len(), 2);
        assert_eq!(projections[0].debt_id, small.id);
        assert_eq!(projections[0].schedule.monthly_payment, dec!(125));
        assert_eq!(projections[1].debt_id, big.id);
        assert_eq!(projections[1].schedule.monthly_payment, dec!(325));
    }

    #[test]
    fn test_summary() {
        let card = debt("Card", dec!(5000), dec!(18.5), dec!(150));
        let mut loan = debt("Loan", dec!(1000), dec!(0), dec!(100));
        loan.total_paid = dec!(400);
        let no_min = DebtPosition {
            min_payment: None,
            ..debt("Family", dec!(300), dec!(0), dec!(1))
        };

        let summary = DebtService::summary(&[card.clone(), loan.clone(), no_min], today());

        assert_eq!(summary.total_principal, dec!(6300));
        assert_eq!(summary.total_paid, dec!(400));
        assert_eq!(summary.total_remaining, dec!(5900));
        assert_eq!(summary.total_monthly_payments, dec!(250));
        assert_eq!(summary.projections.len(), 2);
        // Loan clears in 6 months, well before the card.
        assert_eq!(summary.projections[0].debt_id, loan.id);
        assert_eq!(summary.projections[1].debt_id, card.id);
    }
}
