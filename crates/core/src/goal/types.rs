//! Goal domain types.

use chrono::NaiveDate;
use finnit_shared::types::GoalId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Progress percentages that trigger a milestone notification.
pub const MILESTONES: [u8; 4] = [25, 50, 75, 100];

/// The fields of a goal the tracker needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSnapshot {
    /// Goal.
    pub id: GoalId,
    /// Display name.
    pub name: String,
    /// Amount to save.
    pub target_amount: Decimal,
    /// Running total of applied contributions.
    pub current_amount: Decimal,
    /// Optional deadline.
    pub due_date: Option<NaiveDate>,
}

/// How much of a contribution counts toward the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSplit {
    /// Amount recorded in history.
    pub nominal: Decimal,
    /// Amount added to the goal, capped at what was still missing.
    pub applied: Decimal,
}

impl ContributionSplit {
    /// Portion of the contribution beyond the target.
    #[must_use]
    pub fn overshoot(&self) -> Decimal {
        self.nominal - self.applied
    }
}

/// A past contribution, as used for pace estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributionPoint {
    /// Applied amount.
    pub amount: Decimal,
    /// Contribution date.
    pub date: NaiveDate,
}

/// Derived progress of one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Goal.
    pub goal_id: GoalId,
    /// `100 * current / target`, two places.
    pub percentage: Decimal,
    /// Amount still missing, never negative.
    pub remaining: Decimal,
    /// Days until the due date; negative when overdue.
    pub days_remaining: Option<i64>,
    /// Current amount reached the target.
    pub is_completed: bool,
    /// Completion date at the historical monthly pace.
    pub projected_completion_date: Option<NaiveDate>,
    /// Monthly amount needed to finish by the due date.
    pub monthly_target_contribution: Option<Decimal>,
}

/// Completion estimate at a chosen monthly contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProjection {
    /// Whole months to go; `None` when the contribution cannot finish it.
    pub months_remaining: Option<u32>,
    /// Month of completion, when one is reachable and still ahead.
    pub completion_date: Option<NaiveDate>,
}

/// Portfolio view over all of an owner's goals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRecommendations {
    /// Sum of targets.
    pub total_goals_amount: Decimal,
    /// Sum of current amounts.
    pub total_saved_amount: Decimal,
    /// Mean progress percentage, two places.
    pub average_progress: Decimal,
    /// Remaining amount spread over twelve months.
    pub recommended_monthly_contribution: Decimal,
    /// Unfinished goals due within the due-soon window.
    pub goals_due_soon: Vec<GoalId>,
    /// Goals behind the progress floor close to their due date.
    pub goals_at_risk: Vec<GoalId>,
}
