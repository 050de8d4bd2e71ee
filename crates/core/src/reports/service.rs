//! Report engine for monthly totals and balance projections.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};
use finnit_shared::types::CategoryId;
use finnit_shared::types::money::percentage_of;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    CategoryExpense, FlowLine, MAX_PROJECTION_MONTHS, MonthlyFlow, MonthlyReport,
    ProjectionPoint, WhatIfInput, WhatIfResult,
};
use crate::ledger::TransactionType;

/// Fallback name for a category that no longer resolves.
const UNKNOWN_CATEGORY: &str = "Unknown";

/// Engine for reports and projections.
pub struct ReportService;

impl ReportService {
    /// First and last day of a calendar month.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidPeriod` when the month is outside 1-12.
    pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ReportError> {
        let invalid = || ReportError::InvalidPeriod { year, month };
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(invalid)?;
        Ok((first, last))
    }

    /// Income, expenses and the per-category split for one month.
    ///
    /// Lines outside the month are ignored, as are uncategorized expenses in
    /// the breakdown. Breakdown percentages are shares of all expenses.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidPeriod` for an invalid month.
    pub fn monthly_report(
        year: i32,
        month: u32,
        currency: &str,
        lines: &[FlowLine],
        category_names: &HashMap<CategoryId, String>,
    ) -> Result<MonthlyReport, ReportError> {
        let (first, last) = Self::month_bounds(year, month)?;
        let in_month = move || {
            lines
                .iter()
                .filter(move |line| line.date >= first && line.date <= last)
        };

        let total_income = sum_of(in_month(), TransactionType::Income);
        let total_expenses = sum_of(in_month(), TransactionType::Expense);

        let mut by_category: Vec<(CategoryId, Decimal)> = Vec::new();
        for line in in_month().filter(|line| line.kind == TransactionType::Expense) {
            let Some(category_id) = line.category_id else {
                continue;
            };
            match by_category.iter_mut().find(|(id, _)| *id == category_id) {
                Some((_, amount)) => *amount += line.amount,
                None => by_category.push((category_id, line.amount)),
            }
        }

        let mut category_breakdown: Vec<CategoryExpense> = by_category
            .into_iter()
            .map(|(category_id, amount)| CategoryExpense {
                category_id,
                category_name: category_names
                    .get(&category_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
                amount,
                percentage: percentage_of(amount, total_expenses),
            })
            .collect();
        category_breakdown.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then_with(|| a.category_name.cmp(&b.category_name))
        });

        Ok(MonthlyReport {
            year,
            month,
            currency: currency.to_string(),
            total_income,
            total_expenses,
            net_income: total_income - total_expenses,
            category_breakdown,
        })
    }

    /// Average monthly income and expenses over the `months` before `today`.
    ///
    /// Lines dated after `today` or before the window are ignored. Averages
    /// are rounded to cents.
    #[must_use]
    pub fn average_flow(lines: &[FlowLine], today: NaiveDate, months: u32) -> MonthlyFlow {
        if months == 0 {
            return MonthlyFlow::default();
        }
        let start = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        let window = move || {
            lines
                .iter()
                .filter(move |line| line.date >= start && line.date <= today)
        };
        let divisor = Decimal::from(months);

        MonthlyFlow {
            income: (sum_of(window(), TransactionType::Income) / divisor).round_dp(2),
            expenses: (sum_of(window(), TransactionType::Expense) / divisor).round_dp(2),
        }
    }

    /// Plays the average flow forward from the current total balance.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidHorizon` unless `months` is in
    /// `1..=MAX_PROJECTION_MONTHS`.
    pub fn cash_flow_projection(
        current_balance: Decimal,
        flow: MonthlyFlow,
        today: NaiveDate,
        months: u32,
    ) -> Result<Vec<ProjectionPoint>, ReportError> {
        Self::project(current_balance, flow.net(), today, months, |month| {
            format!("Month {month} projection")
        })
    }

    /// Applies a hypothetical monthly net to the starting balance.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `BlankScenarioName` for an empty name
    /// - `NegativeAmount` for negative income or expenses
    /// - `InvalidHorizon` for a projection length outside the supported range
    pub fn what_if(starting_balance: Decimal, input: &WhatIfInput) -> Result<WhatIfResult, ReportError> {
        let scenario_name = input.scenario_name.trim();
        if scenario_name.is_empty() {
            return Err(ReportError::BlankScenarioName);
        }
        if input.monthly_income.is_sign_negative() || input.monthly_expenses.is_sign_negative() {
            return Err(ReportError::NegativeAmount);
        }

        let net = input.monthly_income - input.monthly_expenses;
        let projections = Self::project(
            starting_balance,
            net,
            input.start_date,
            input.months_to_project,
            |month| format!("{scenario_name} - Month {month}"),
        )?;
        let final_balance = projections
            .last()
            .map_or(starting_balance, |point| point.projected_balance);

        Ok(WhatIfResult {
            scenario_name: scenario_name.to_string(),
            projections,
            final_balance,
            total_savings: final_balance - starting_balance,
        })
    }

    fn project(
        starting_balance: Decimal,
        monthly_net: Decimal,
        start: NaiveDate,
        months: u32,
        label: impl Fn(u32) -> String,
    ) -> Result<Vec<ProjectionPoint>, ReportError> {
        if months == 0 || months > MAX_PROJECTION_MONTHS {
            return Err(ReportError::InvalidHorizon {
                months,
                max: MAX_PROJECTION_MONTHS,
            });
        }

        let mut balance = starting_balance;
        (1..=months)
            .map(|month| {
                balance += monthly_net;
                let date = start
                    .checked_add_months(Months::new(month))
                    .ok_or(ReportError::DateOutOfRange)?;
                Ok(ProjectionPoint {
                    date,
                    projected_balance: balance,
                    description: label(month),
                })
            })
            .collect()
    }
}

fn sum_of<'a>(lines: impl Iterator<Item = &'a FlowLine>, kind: TransactionType) -> Decimal {
    lines
        .filter(|line| line.kind == kind)
        .map(|line| line.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn flow(kind: TransactionType, amount: Decimal, day: NaiveDate) -> FlowLine {
        FlowLine {
            kind,
            category_id: None,
            amount,
            date: day,
        }
    }

    #[rstest]
    #[case(2026, 2, date(2026, 2, 1), date(2026, 2, 28))]
    #[case(2028, 2, date(2028, 2, 1), date(2028, 2, 29))]
    #[case(2026, 12, date(2026, 12, 1), date(2026, 12, 31))]
    fn test_month_bounds(
        #[case] year: i32,
        #[case] month: u32,
        #[case] first: NaiveDate,
        #[case] last: NaiveDate,
    ) {
        assert_eq!(ReportService::month_bounds(year, month), Ok((first, last)));
    }

    #[test]
    fn test_month_bounds_rejects_month_thirteen() {
        assert_eq!(
            ReportService::month_bounds(2026, 13),
            Err(ReportError::InvalidPeriod { year: 2026, month: 13 })
        );
    }

    #[test]
    fn test_average_flow_uses_window() {
        let today = date(2026, 6, 30);
        let lines = [
            flow(TransactionType::Income, dec!(6000), date(2026, 3, 1)),
            flow(TransactionType::Expense, dec!(1200), date(2026, 5, 10)),
            flow(TransactionType::Expense, dec!(999), date(2025, 11, 1)),
            flow(TransactionType::Income, dec!(500), date(2026, 7, 1)),
            flow(TransactionType::Transfer, dec!(300), date(2026, 6, 1)),
        ];

        let average = ReportService::average_flow(&lines, today, 6);

        assert_eq!(average.income, dec!(1000));
        assert_eq!(average.expenses, dec!(200));
        assert_eq!(average.net(), dec!(800));
    }

    #[test]
    fn test_average_flow_rounds_to_cents() {
        let lines = [flow(TransactionType::Expense, dec!(100), date(2026, 3, 1))];
        let average = ReportService::average_flow(&lines, date(2026, 3, 15), 3);
        assert_eq!(average.expenses, dec!(33.33));
    }
}
