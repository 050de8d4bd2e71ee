//! Budget service for usage aggregation, alerts and pre-transaction checks.

use std::collections::HashSet;

use finnit_shared::types::money::{exact_percentage, percentage_of};
use rust_decimal::Decimal;

use super::error::BudgetError;
use super::types::{
    AlertScope, AlertSeverity, BudgetAlert, BudgetCheck, BudgetDefinition, BudgetSummary,
    BudgetUsage, CategoryCap, CategoryUsage, ExpenseLine,
};

/// Utilization at which a category counts as near its cap in summaries.
pub const NEAR_BUDGET_PERCENTAGE: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

const MEDIUM_SEVERITY_PERCENTAGE: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Validates caps before a budget is written.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NegativeAmount` for a negative cap or total, and
    /// `BudgetError::DuplicateCategory` when a category is capped twice.
    pub fn validate_definition(definition: &BudgetDefinition) -> Result<(), BudgetError> {
        if definition
            .amount_total
            .is_some_and(|total| total.is_sign_negative() && !total.is_zero())
        {
            return Err(BudgetError::NegativeAmount);
        }

        let mut seen = HashSet::with_capacity(definition.caps.len());
        for cap in &definition.caps {
            if cap.cap < Decimal::ZERO {
                return Err(BudgetError::NegativeAmount);
            }
            if !seen.insert(cap.category_id) {
                return Err(BudgetError::DuplicateCategory(cap.category_id.into_inner()));
            }
        }
        Ok(())
    }

    /// Computes spend against every cap of the budget.
    ///
    /// Lines outside the budget's month are ignored, so callers may pass a
    /// wider range than the period.
    #[must_use]
    pub fn calculate_usage(definition: &BudgetDefinition, lines: &[ExpenseLine]) -> BudgetUsage {
        let in_window: Vec<&ExpenseLine> = lines
            .iter()
            .filter(|line| definition.period.contains(line.date))
            .collect();

        let total_spent: Decimal = in_window.iter().map(|line| line.amount).sum();

        let categories = definition
            .caps
            .iter()
            .map(|cap| {
                let spent = in_window
                    .iter()
                    .filter(|line| line.category_id == Some(cap.category_id))
                    .map(|line| line.amount)
                    .sum();
                Self::category_usage(cap, spent)
            })
            .collect();

        BudgetUsage {
            period: definition.period,
            total_budget: definition.amount_total,
            total_spent,
            remaining_budget: definition.amount_total.map(|total| total - total_spent),
            utilization_percentage: definition
                .amount_total
                .map(|total| percentage_of(total_spent, total)),
            categories,
        }
    }

    fn category_usage(cap: &CategoryCap, spent: Decimal) -> CategoryUsage {
        CategoryUsage {
            category_id: cap.category_id,
            name: cap.name.clone(),
            budgeted: cap.cap,
            spent,
            remaining: cap.cap - spent,
            utilization_percentage: percentage_of(spent, cap.cap),
            is_over_budget: exact_percentage(spent, cap.cap) > Decimal::ONE_HUNDRED,
        }
    }

    /// Severity for an unrounded utilization percentage.
    #[must_use]
    pub fn severity(percentage: Decimal, is_total: bool) -> AlertSeverity {
        if percentage >= Decimal::ONE_HUNDRED {
            if is_total {
                AlertSeverity::Critical
            } else {
                AlertSeverity::High
            }
        } else if percentage >= MEDIUM_SEVERITY_PERCENTAGE {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }

    /// Alerts for every cap at or above `threshold` percent, most used first.
    #[must_use]
    pub fn alerts(usage: &BudgetUsage, threshold: Decimal) -> Vec<BudgetAlert> {
        let mut alerts: Vec<BudgetAlert> = usage
            .categories
            .iter()
            .filter(|category| exact_percentage(category.spent, category.budgeted) >= threshold)
            .map(|category| {
                Self::alert(
                    AlertScope::Category {
                        category_id: category.category_id,
                        name: category.name.clone(),
                    },
                    category.budgeted,
                    category.spent,
                )
            })
            .collect();

        if let Some(total) = usage.total_budget
            && exact_percentage(usage.total_spent, total) >= threshold
        {
            alerts.push(Self::alert(AlertScope::Total, total, usage.total_spent));
        }

        alerts.sort_by(|a, b| b.percentage.cmp(&a.percentage));
        alerts
    }

    fn alert(scope: AlertScope, budgeted: Decimal, spent: Decimal) -> BudgetAlert {
        let is_total = matches!(scope, AlertScope::Total);
        let exact = exact_percentage(spent, budgeted);
        let percentage = exact.round_dp(2);
        let message = if exact >= Decimal::ONE_HUNDRED {
            format!(
                "Budget exceeded by {}",
                (spent - budgeted).round_dp(2).normalize()
            )
        } else {
            format!(
                "{}% of budget remaining",
                (Decimal::ONE_HUNDRED - percentage).round_dp(2).normalize()
            )
        };

        BudgetAlert {
            scope,
            budgeted,
            spent,
            percentage,
            severity: Self::severity(exact, is_total),
            message,
        }
    }

    /// Advisory check of a prospective expense against its category cap.
    ///
    /// Refuses only when the projected spend would exceed the cap; warns once
    /// the projected utilization reaches `warning_threshold`.
    #[must_use]
    pub fn check_before_transaction(
        cap: Option<&CategoryCap>,
        current_spent: Decimal,
        amount: Decimal,
        warning_threshold: Decimal,
    ) -> BudgetCheck {
        let Some(cap) = cap else {
            return BudgetCheck::unrestricted();
        };

        let projected = current_spent + amount;
        if projected > cap.cap {
            return BudgetCheck {
                allowed: false,
                warning: Some(format!(
                    "This transaction would exceed the budget for {} by {}",
                    cap.name,
                    (projected - cap.cap).round_dp(2).normalize()
                )),
            };
        }

        let projected_percentage = exact_percentage(projected, cap.cap);
        if projected_percentage >= warning_threshold {
            return BudgetCheck {
                allowed: true,
                warning: Some(format!(
                    "This transaction will use {}% of your {} budget",
                    projected_percentage.round_dp(2).normalize(),
                    cap.name
                )),
            };
        }

        BudgetCheck::unrestricted()
    }

    /// Month overview measured against the sum of category caps.
    #[must_use]
    pub fn summary(definition: &BudgetDefinition, usage: BudgetUsage) -> BudgetSummary {
        let total_budgeted: Decimal = definition.caps.iter().map(|cap| cap.cap).sum();
        let categories_over_budget = usage
            .categories
            .iter()
            .filter(|category| category.is_over_budget)
            .count();
        let categories_near_budget = usage
            .categories
            .iter()
            .filter(|category| {
                (NEAR_BUDGET_PERCENTAGE..=Decimal::ONE_HUNDRED)
                    .contains(&exact_percentage(category.spent, category.budgeted))
            })
            .count();

        BudgetSummary {
            period: definition.period,
            total_budgeted,
            total_spent: usage.total_spent,
            total_remaining: total_budgeted - usage.total_spent,
            overall_percentage: percentage_of(usage.total_spent, total_budgeted),
            category_count: definition.caps.len(),
            categories_over_budget,
            categories_near_budget,
            categories: usage.categories,
        }
    }
}
