//! Goal service: contribution rules and progress metrics.

use chrono::{Datelike, Months, NaiveDate};
use finnit_shared::AppResult;
use finnit_shared::LedgerConfig;
use finnit_shared::types::money::{non_negative, percentage_of, validate_amount};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::GoalError;
use super::types::{
    ContributionPoint, ContributionSplit, GoalProgress, GoalProjection, GoalRecommendations,
    GoalSnapshot, MILESTONES,
};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Calendar months from `from` to `to`, counting a started month as whole.
#[must_use]
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let whole = i64::from(to.year() - from.year()) * 12 + i64::from(to.month())
        - i64::from(from.month());
    if to.day() > from.day() { whole + 1 } else { whole }
}

fn add_months(date: NaiveDate, months: Decimal) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months.ceil().to_u32()?))
}

/// Goal service for business logic.
pub struct GoalService;

impl GoalService {
    /// Validates a new or changed target against what is already saved.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad amount or a target below the saved amount.
    pub fn validate_target(target: Decimal, current_amount: Decimal) -> AppResult<Decimal> {
        let target = validate_amount(target)?;
        if target < current_amount {
            return Err(GoalError::TargetBelowSaved {
                target,
                current: current_amount,
            }
            .into());
        }
        Ok(target)
    }

    /// Splits a new contribution into its nominal and applied parts.
    ///
    /// The goal's current amount grows by the applied part only, so it never
    /// exceeds the target; the nominal amount stays in history.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a bad amount and `GoalAlreadyReached` when the
    /// goal is already complete.
    pub fn plan_contribution(goal: &GoalSnapshot, amount: Decimal) -> AppResult<ContributionSplit> {
        let nominal = validate_amount(amount)?;
        if goal.current_amount >= goal.target_amount {
            return Err(GoalError::AlreadyReached.into());
        }
        let missing = goal.target_amount - goal.current_amount;
        Ok(ContributionSplit {
            nominal,
            applied: nominal.min(missing),
        })
    }

    /// New current amount after removing a contribution's applied part.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the result would be negative.
    pub fn plan_removal(current_amount: Decimal, applied: Decimal) -> AppResult<Decimal> {
        if applied > current_amount {
            return Err(GoalError::NegativeAmount {
                applied,
                current: current_amount,
            }
            .into());
        }
        Ok(current_amount - applied)
    }

    /// Validates that a goal can be deleted.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when contributions exist.
    pub fn ensure_deletable(contribution_count: u64) -> AppResult<()> {
        if contribution_count > 0 {
            return Err(GoalError::HasContributions.into());
        }
        Ok(())
    }

    /// Milestones passed when the amount moves from `before` to `after`.
    #[must_use]
    pub fn crossed_milestones(target: Decimal, before: Decimal, after: Decimal) -> Vec<u8> {
        if target <= Decimal::ZERO {
            return Vec::new();
        }
        let before_pct = percentage_of(before, target);
        let after_pct = percentage_of(after, target);
        MILESTONES
            .into_iter()
            .filter(|milestone| {
                let mark = Decimal::from(*milestone);
                before_pct < mark && after_pct >= mark
            })
            .collect()
    }

    /// Average applied amount per calendar month since the first contribution.
    #[must_use]
    pub fn monthly_pace(contributions: &[ContributionPoint], today: NaiveDate) -> Option<Decimal> {
        let first = contributions.iter().map(|point| point.date).min()?;
        let total: Decimal = contributions.iter().map(|point| point.amount).sum();
        let months = months_between(first, today).max(1);
        let pace = total / Decimal::from(months);
        (pace > Decimal::ZERO).then_some(pace)
    }

    /// Derived progress of a goal as of `today`.
    #[must_use]
    pub fn calculate_progress(
        goal: &GoalSnapshot,
        contributions: &[ContributionPoint],
        today: NaiveDate,
    ) -> GoalProgress {
        let remaining = non_negative(goal.target_amount - goal.current_amount);
        let is_completed = goal.current_amount >= goal.target_amount;
        let days_remaining = goal.due_date.map(|due| (due - today).num_days());

        let monthly_target_contribution = goal.due_date.map(|due| {
            let months = months_between(today, due).max(1);
            (remaining / Decimal::from(months)).round_dp(2)
        });

        let projected_completion_date = if is_completed {
            None
        } else {
            Self::monthly_pace(contributions, today)
                .and_then(|pace| add_months(today, remaining / pace))
        };

        GoalProgress {
            goal_id: goal.id,
            percentage: percentage_of(goal.current_amount, goal.target_amount),
            remaining,
            days_remaining,
            is_completed,
            projected_completion_date,
            monthly_target_contribution,
        }
    }

    /// Completion estimate at a fixed monthly contribution.
    #[must_use]
    pub fn projection(goal: &GoalSnapshot, monthly: Decimal, today: NaiveDate) -> GoalProjection {
        let remaining = goal.target_amount - goal.current_amount;
        if remaining <= Decimal::ZERO {
            return GoalProjection {
                months_remaining: Some(0),
                completion_date: None,
            };
        }
        if monthly <= Decimal::ZERO {
            return GoalProjection {
                months_remaining: None,
                completion_date: None,
            };
        }

        let months = (remaining / monthly).ceil();
        GoalProjection {
            months_remaining: months.to_u32(),
            completion_date: add_months(today, months),
        }
    }

    /// Totals, a flat monthly recommendation and goals needing attention.
    #[must_use]
    pub fn recommendations(
        goals: &[GoalSnapshot],
        today: NaiveDate,
        config: &LedgerConfig,
    ) -> GoalRecommendations {
        if goals.is_empty() {
            return GoalRecommendations::default();
        }

        let total_goals_amount: Decimal = goals.iter().map(|goal| goal.target_amount).sum();
        let total_saved_amount: Decimal = goals.iter().map(|goal| goal.current_amount).sum();
        let total_progress: Decimal = goals
            .iter()
            .map(|goal| percentage_of(goal.current_amount, goal.target_amount))
            .sum();

        let mut goals_due_soon = Vec::new();
        let mut goals_at_risk = Vec::new();
        for goal in goals {
            let Some(due) = goal.due_date else { continue };
            let days = (due - today).num_days();
            let progress = percentage_of(goal.current_amount, goal.target_amount);

            if days <= config.goal_due_soon_days && goal.current_amount < goal.target_amount {
                goals_due_soon.push(goal.id);
            }
            if progress < config.goal_at_risk_progress && days > 0 && days <= config.goal_at_risk_days
            {
                goals_at_risk.push(goal.id);
            }
        }

        GoalRecommendations {
            total_goals_amount,
            total_saved_amount,
            average_progress: (total_progress / Decimal::from(goals.len())).round_dp(2),
            recommended_monthly_contribution: non_negative(
                (total_goals_amount - total_saved_amount) / MONTHS_PER_YEAR,
            )
            .round_dp(2),
            goals_due_soon,
            goals_at_risk,
        }
    }
}
