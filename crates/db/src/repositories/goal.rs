//! Goal repository: savings goals and their contributions.
//!
//! `current_amount` always equals the sum of the contributions' applied
//! amounts. A contribution that would overshoot the target is stored in full
//! but only its applied part moves the goal.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use finnit_core::goal::{
    ContributionPoint, GoalProgress, GoalProjection, GoalRecommendations, GoalService,
    GoalSnapshot,
};
use finnit_core::notify::{Notification, NotificationSink, NullSink};
use finnit_shared::LedgerConfig;
use finnit_shared::types::money::parse_currency;
use finnit_shared::types::{GoalId, TransactionId, UserId};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::required_name;
use super::transaction::find_owned_transaction;
use crate::entities::{goal_contributions, goals};
use crate::error::{StoreError, StoreResult};

/// Input for creating a goal.
#[derive(Debug, Clone)]
pub struct CreateGoalInput {
    /// Display name.
    pub name: String,
    /// Amount to save.
    pub target_amount: Decimal,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Optional deadline.
    pub due_date: Option<NaiveDate>,
}

/// Input for updating a goal.
#[derive(Debug, Clone, Default)]
pub struct UpdateGoalInput {
    /// New name.
    pub name: Option<String>,
    /// New target; cannot drop below the amount already saved.
    pub target_amount: Option<Decimal>,
    /// New deadline; `Some(None)` clears it.
    pub due_date: Option<Option<NaiveDate>>,
}

/// Input for adding a contribution.
#[derive(Debug, Clone)]
pub struct AddContributionInput {
    /// Nominal amount.
    pub amount: Decimal,
    /// The owner's transaction that funded it.
    pub transaction_id: Option<TransactionId>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

/// Goal repository.
#[derive(Clone)]
pub struct GoalRepository {
    db: DatabaseConnection,
    sink: Arc<dyn NotificationSink>,
    config: LedgerConfig,
}

impl std::fmt::Debug for GoalRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoalRepository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GoalRepository {
    /// Creates a goal repository that drops notifications.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            sink: Arc::new(NullSink),
            config: LedgerConfig::default(),
        }
    }

    /// Sends milestone notifications to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Uses `config` for recommendation thresholds.
    #[must_use]
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a goal with nothing saved yet.
    pub async fn create_goal(&self, owner: UserId, input: CreateGoalInput) -> StoreResult<goals::Model> {
        let name = required_name(&input.name, "Goal")?;
        let target_amount = GoalService::validate_target(input.target_amount, Decimal::ZERO)?;
        let currency = parse_currency(&input.currency)?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let goal = goals::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(owner.into_inner()),
            name: Set(name),
            target_amount: Set(target_amount),
            current_amount: Set(Decimal::ZERO),
            currency: Set(currency.to_string()),
            due_date: Set(input.due_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(goal_id = %goal.id, target = %goal.target_amount, "goal created");
        Ok(goal)
    }

    /// Finds a goal owned by `owner`.
    pub async fn find_goal(&self, owner: UserId, goal_id: GoalId) -> StoreResult<goals::Model> {
        find_owned_goal(&self.db, owner, goal_id.into_inner()).await
    }

    /// Lists the owner's goals, nearest deadline first.
    pub async fn list_goals(&self, owner: UserId) -> StoreResult<Vec<goals::Model>> {
        Ok(goals::Entity::find()
            .filter(goals::Column::UserId.eq(owner.into_inner()))
            .order_by_asc(goals::Column::DueDate)
            .order_by_asc(goals::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Updates name, target or deadline.
    pub async fn update_goal(
        &self,
        owner: UserId,
        goal_id: GoalId,
        input: UpdateGoalInput,
    ) -> StoreResult<goals::Model> {
        let goal = self.find_goal(owner, goal_id).await?;
        let target_amount = match input.target_amount {
            Some(target) => GoalService::validate_target(target, goal.current_amount)?,
            None => goal.target_amount,
        };

        let mut active: goals::ActiveModel = goal.into();
        if let Some(name) = input.name {
            active.name = Set(required_name(&name, "Goal")?);
        }
        active.target_amount = Set(target_amount);
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a goal without contributions.
    pub async fn delete_goal(&self, owner: UserId, goal_id: GoalId) -> StoreResult<()> {
        let goal = self.find_goal(owner, goal_id).await?;
        let contributions = goal_contributions::Entity::find()
            .filter(goal_contributions::Column::GoalId.eq(goal.id))
            .count(&self.db)
            .await?;
        GoalService::ensure_deletable(contributions)?;

        goals::Entity::delete_by_id(goal.id).exec(&self.db).await?;
        tracing::info!(goal_id = %goal.id, "goal deleted");
        Ok(())
    }

    /// Adds a contribution and dispatches any milestones it crosses.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a goal or transaction the caller does not own,
    /// `Validation` for a bad amount, and `GoalAlreadyReached` when the goal
    /// is already complete.
    pub async fn add_contribution(
        &self,
        owner: UserId,
        goal_id: GoalId,
        input: AddContributionInput,
    ) -> StoreResult<goal_contributions::Model> {
        self.find_goal(owner, goal_id).await?;
        let transaction_id = match input.transaction_id {
            Some(id) => Some(find_owned_transaction(&self.db, owner, id.into_inner()).await?.id),
            None => None,
        };

        let txn = self.db.begin().await?;
        let goal = lock_owned_goal(&txn, owner, goal_id.into_inner()).await?;
        let split = GoalService::plan_contribution(&snapshot(&goal), input.amount)?;

        let contribution = goal_contributions::ActiveModel {
            id: Set(Uuid::now_v7()),
            goal_id: Set(goal.id),
            transaction_id: Set(transaction_id),
            amount: Set(split.nominal),
            applied_amount: Set(split.applied),
            contribution_date: Set(input.date.unwrap_or_else(|| Utc::now().date_naive())),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;
        move_current_amount(&txn, goal.id, split.applied).await?;

        txn.commit().await?;

        let after = goal.current_amount + split.applied;
        tracing::info!(
            goal_id = %goal.id,
            nominal = %split.nominal,
            applied = %split.applied,
            current = %after,
            "goal contribution added"
        );
        if !split.overshoot().is_zero() {
            tracing::debug!(goal_id = %goal.id, overshoot = %split.overshoot(), "contribution capped at target");
        }

        for milestone in GoalService::crossed_milestones(goal.target_amount, goal.current_amount, after) {
            self.sink.dispatch(Notification::GoalMilestone {
                owner,
                goal_id,
                goal_name: goal.name.clone(),
                milestone,
                current_amount: after,
                target_amount: goal.target_amount,
            });
        }

        Ok(contribution)
    }

    /// Removes a contribution and takes back its applied amount.
    pub async fn remove_contribution(&self, owner: UserId, contribution_id: Uuid) -> StoreResult<()> {
        let contribution = goal_contributions::Entity::find_by_id(contribution_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::not_found("Contribution not found"))?;

        let txn = self.db.begin().await?;
        let goal = match lock_owned_goal(&txn, owner, contribution.goal_id).await {
            Ok(goal) => goal,
            Err(StoreError::Domain(finnit_shared::AppError::NotFound(_))) => {
                return Err(StoreError::not_found("Contribution not found"));
            }
            Err(err) => return Err(err),
        };
        let contribution = goal_contributions::Entity::find_by_id(contribution.id)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("Contribution not found"))?;

        let remaining = GoalService::plan_removal(goal.current_amount, contribution.applied_amount)?;
        goal_contributions::Entity::delete_by_id(contribution.id)
            .exec(&txn)
            .await?;
        move_current_amount(&txn, goal.id, -contribution.applied_amount).await?;

        txn.commit().await?;

        tracing::info!(goal_id = %goal.id, current = %remaining, "goal contribution removed");
        Ok(())
    }

    /// Contributions to a goal, newest first.
    pub async fn list_contributions(
        &self,
        owner: UserId,
        goal_id: GoalId,
    ) -> StoreResult<Vec<goal_contributions::Model>> {
        let goal = self.find_goal(owner, goal_id).await?;
        Ok(goal_contributions::Entity::find()
            .filter(goal_contributions::Column::GoalId.eq(goal.id))
            .order_by_desc(goal_contributions::Column::ContributionDate)
            .order_by_desc(goal_contributions::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Progress metrics as of `today`.
    pub async fn goal_progress(
        &self,
        owner: UserId,
        goal_id: GoalId,
        today: NaiveDate,
    ) -> StoreResult<GoalProgress> {
        let goal = self.find_goal(owner, goal_id).await?;
        let points: Vec<ContributionPoint> = self
            .list_contributions(owner, goal_id)
            .await?
            .iter()
            .map(|contribution| ContributionPoint {
                amount: contribution.applied_amount,
                date: contribution.contribution_date,
            })
            .collect();
        Ok(GoalService::calculate_progress(&snapshot(&goal), &points, today))
    }

    /// When the goal completes at a fixed monthly contribution.
    pub async fn goal_projection(
        &self,
        owner: UserId,
        goal_id: GoalId,
        monthly: Decimal,
        today: NaiveDate,
    ) -> StoreResult<GoalProjection> {
        let goal = self.find_goal(owner, goal_id).await?;
        Ok(GoalService::projection(&snapshot(&goal), monthly, today))
    }

    /// Portfolio-level totals and the goals that need attention.
    pub async fn goal_recommendations(
        &self,
        owner: UserId,
        today: NaiveDate,
    ) -> StoreResult<GoalRecommendations> {
        let snapshots: Vec<GoalSnapshot> = self.list_goals(owner).await?.iter().map(snapshot).collect();
        Ok(GoalService::recommendations(&snapshots, today, &self.config))
    }
}

async fn find_owned_goal<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    goal_id: Uuid,
) -> StoreResult<goals::Model> {
    goals::Entity::find_by_id(goal_id)
        .filter(goals::Column::UserId.eq(owner.into_inner()))
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Goal not found"))
}

async fn lock_owned_goal<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    goal_id: Uuid,
) -> StoreResult<goals::Model> {
    goals::Entity::find_by_id(goal_id)
        .filter(goals::Column::UserId.eq(owner.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Goal not found"))
}

async fn move_current_amount<C: ConnectionTrait>(
    conn: &C,
    goal_id: Uuid,
    delta: Decimal,
) -> Result<(), DbErr> {
    if delta.is_zero() {
        return Ok(());
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    goals::Entity::update_many()
        .col_expr(
            goals::Column::CurrentAmount,
            Expr::col(goals::Column::CurrentAmount).add(delta),
        )
        .col_expr(goals::Column::UpdatedAt, Expr::value(now))
        .filter(goals::Column::Id.eq(goal_id))
        .exec(conn)
        .await?;
    Ok(())
}

fn snapshot(goal: &goals::Model) -> GoalSnapshot {
    GoalSnapshot {
        id: GoalId::from_uuid(goal.id),
        name: goal.name.clone(),
        target_amount: goal.target_amount,
        current_amount: goal.current_amount,
        due_date: goal.due_date,
    }
}
