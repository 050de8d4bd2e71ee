//! Budget repository for monthly budgets and their category caps.
//!
//! Usage, alerts and summaries are computed on demand from the owner's
//! expense history; nothing derived is stored.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use finnit_core::budget::{
    BudgetAlert, BudgetCheck, BudgetDefinition, BudgetError, BudgetPeriod, BudgetService,
    BudgetSummary, BudgetUsage, CategoryCap, ExpenseLine,
};
use finnit_core::ledger::TransactionType as CoreTransactionType;
use finnit_core::notify::{Notification, NotificationSink, NullSink};
use finnit_shared::types::money::parse_currency;
use finnit_shared::types::{BudgetId, CategoryId, UserId};
use finnit_shared::{AppError, LedgerConfig};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::category::visible_category;
use crate::entities::{
    budget_categories, budgets, categories, sea_orm_active_enums::TransactionType, transactions,
};
use crate::error::{StoreError, StoreResult};

/// A category cap in a budget request.
#[derive(Debug, Clone, Copy)]
pub struct BudgetCapInput {
    /// Capped category.
    pub category_id: CategoryId,
    /// Monthly cap.
    pub cap_amount: Decimal,
}

/// Input for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Optional overall limit.
    pub amount_total: Option<Decimal>,
    /// Per-category caps.
    pub categories: Vec<BudgetCapInput>,
}

/// Input for updating a budget.
#[derive(Debug, Clone, Default)]
pub struct UpdateBudgetInput {
    /// New overall limit; `Some(None)` removes it.
    pub amount_total: Option<Option<Decimal>>,
    /// Replacement caps; the previous set is discarded.
    pub categories: Option<Vec<BudgetCapInput>>,
}

/// A budget with its category caps.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetWithCategories {
    /// Budget record.
    pub budget: budgets::Model,
    /// Category caps.
    pub categories: Vec<budget_categories::Model>,
}

/// Budget repository.
#[derive(Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
    sink: Arc<dyn NotificationSink>,
    config: LedgerConfig,
}

impl std::fmt::Debug for BudgetRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetRepository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BudgetRepository {
    /// Creates a budget repository that drops notifications.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            sink: Arc::new(NullSink),
            config: LedgerConfig::default(),
        }
    }

    /// Sends budget alerts to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Uses `config` for alert and warning thresholds.
    #[must_use]
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a budget for a calendar month.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `Validation` for an invalid period, negative amounts or a category
    ///   capped twice
    /// - `NotFound` for a category the caller cannot see
    /// - `Conflict` when the owner already has a budget for the month
    pub async fn create_budget(
        &self,
        owner: UserId,
        input: CreateBudgetInput,
    ) -> StoreResult<BudgetWithCategories> {
        let period = BudgetPeriod::new(input.year, input.month).map_err(AppError::from)?;
        let currency = parse_currency(&input.currency)?;
        let caps = self.resolve_caps(owner, &input.categories).await?;
        BudgetService::validate_definition(&BudgetDefinition {
            period,
            amount_total: input.amount_total,
            caps: caps.clone(),
        })
        .map_err(AppError::from)?;

        if self.period_budget(owner, period).await?.is_some() {
            return Err(AppError::from(BudgetError::AlreadyExists).into());
        }

        let txn = self.db.begin().await?;
        let now: DateTimeWithTimeZone = Utc::now().into();
        let budget = budgets::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(owner.into_inner()),
            year: Set(period.year),
            month: Set(period.month.cast_signed()),
            currency: Set(currency.to_string()),
            amount_total: Set(input.amount_total),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| StoreError::unique_or(err, || BudgetError::AlreadyExists.into()))?;
        let categories = insert_caps(&txn, budget.id, &caps).await?;
        txn.commit().await?;

        tracing::info!(
            budget_id = %budget.id,
            year = budget.year,
            month = budget.month,
            caps = categories.len(),
            "budget created"
        );
        Ok(BudgetWithCategories { budget, categories })
    }

    /// Finds a budget owned by `owner`.
    pub async fn find_budget(
        &self,
        owner: UserId,
        budget_id: BudgetId,
    ) -> StoreResult<BudgetWithCategories> {
        let budget = find_owned_budget(&self.db, owner, budget_id.into_inner()).await?;
        with_categories(&self.db, budget).await
    }

    /// The owner's budget for a month, if any.
    pub async fn find_for_period(
        &self,
        owner: UserId,
        year: i32,
        month: u32,
    ) -> StoreResult<Option<BudgetWithCategories>> {
        let period = BudgetPeriod::new(year, month).map_err(AppError::from)?;
        match self.period_budget(owner, period).await? {
            Some(budget) => Ok(Some(with_categories(&self.db, budget).await?)),
            None => Ok(None),
        }
    }

    /// The budget for the month containing `today`, if any.
    pub async fn current_budget(
        &self,
        owner: UserId,
        today: NaiveDate,
    ) -> StoreResult<Option<BudgetWithCategories>> {
        let period = BudgetPeriod::containing(today);
        self.find_for_period(owner, period.year, period.month).await
    }

    /// Lists the owner's budgets, most recent month first.
    pub async fn list_budgets(&self, owner: UserId) -> StoreResult<Vec<budgets::Model>> {
        Ok(budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(owner.into_inner()))
            .order_by_desc(budgets::Column::Year)
            .order_by_desc(budgets::Column::Month)
            .all(&self.db)
            .await?)
    }

    /// Updates the overall limit and replaces the caps when given.
    pub async fn update_budget(
        &self,
        owner: UserId,
        budget_id: BudgetId,
        input: UpdateBudgetInput,
    ) -> StoreResult<BudgetWithCategories> {
        let existing = self.find_budget(owner, budget_id).await?;
        let period = period_of(&existing.budget)?;
        let amount_total = input.amount_total.unwrap_or(existing.budget.amount_total);

        let caps = match &input.categories {
            Some(requested) => Some(self.resolve_caps(owner, requested).await?),
            None => None,
        };
        let check_caps = match &caps {
            Some(caps) => caps.clone(),
            None => cap_definitions(&self.db, &existing.categories).await?,
        };
        BudgetService::validate_definition(&BudgetDefinition {
            period,
            amount_total,
            caps: check_caps,
        })
        .map_err(AppError::from)?;

        let txn = self.db.begin().await?;
        let budget = budgets::Entity::find_by_id(existing.budget.id)
            .filter(budgets::Column::UserId.eq(owner.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("Budget not found"))?;

        let mut active: budgets::ActiveModel = budget.into();
        active.amount_total = Set(amount_total);
        active.updated_at = Set(Utc::now().into());
        let budget = active.update(&txn).await?;

        if let Some(caps) = caps {
            budget_categories::Entity::delete_many()
                .filter(budget_categories::Column::BudgetId.eq(budget.id))
                .exec(&txn)
                .await?;
            insert_caps(&txn, budget.id, &caps).await?;
        }
        let result = with_categories(&txn, budget).await?;
        txn.commit().await?;

        tracing::info!(budget_id = %result.budget.id, "budget updated");
        Ok(result)
    }

    /// Deletes a budget and its caps.
    pub async fn delete_budget(&self, owner: UserId, budget_id: BudgetId) -> StoreResult<()> {
        let budget = find_owned_budget(&self.db, owner, budget_id.into_inner()).await?;

        let txn = self.db.begin().await?;
        budget_categories::Entity::delete_many()
            .filter(budget_categories::Column::BudgetId.eq(budget.id))
            .exec(&txn)
            .await?;
        budgets::Entity::delete_by_id(budget.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(budget_id = %budget.id, "budget deleted");
        Ok(())
    }

    /// Copies a budget's limit, currency and caps into another month.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the target month already has a budget and
    /// `NotFound` for an unknown template.
    pub async fn create_from_template(
        &self,
        owner: UserId,
        template_id: BudgetId,
        year: i32,
        month: u32,
    ) -> StoreResult<BudgetWithCategories> {
        let period = BudgetPeriod::new(year, month).map_err(AppError::from)?;
        if self.period_budget(owner, period).await?.is_some() {
            return Err(AppError::from(BudgetError::AlreadyExists).into());
        }

        let template = match self.find_budget(owner, template_id).await {
            Ok(template) => template,
            Err(StoreError::Domain(AppError::NotFound(_))) => {
                return Err(StoreError::not_found("Template budget not found"));
            }
            Err(err) => return Err(err),
        };

        self.create_budget(
            owner,
            CreateBudgetInput {
                year,
                month,
                currency: template.budget.currency,
                amount_total: template.budget.amount_total,
                categories: template
                    .categories
                    .iter()
                    .map(|cap| BudgetCapInput {
                        category_id: CategoryId::from_uuid(cap.category_id),
                        cap_amount: cap.cap_amount,
                    })
                    .collect(),
            },
        )
        .await
    }

    /// Spending against a budget over its calendar month.
    pub async fn budget_usage(&self, owner: UserId, budget_id: BudgetId) -> StoreResult<BudgetUsage> {
        let budget = self.find_budget(owner, budget_id).await?;
        let definition = definition_of(&self.db, &budget).await?;
        let lines = self.expense_lines(owner, definition.period).await?;
        Ok(BudgetService::calculate_usage(&definition, &lines))
    }

    /// Alerts for categories and the total at or above `threshold` percent.
    ///
    /// Empty when the owner has no budget for the month. `threshold` falls
    /// back to the configured alert threshold.
    pub async fn budget_alerts(
        &self,
        owner: UserId,
        year: i32,
        month: u32,
        threshold: Option<Decimal>,
    ) -> StoreResult<Vec<BudgetAlert>> {
        let Some(budget) = self.find_for_period(owner, year, month).await? else {
            return Ok(Vec::new());
        };
        let definition = definition_of(&self.db, &budget).await?;
        let lines = self.expense_lines(owner, definition.period).await?;
        let usage = BudgetService::calculate_usage(&definition, &lines);
        Ok(BudgetService::alerts(
            &usage,
            threshold.unwrap_or(self.config.budget_alert_threshold),
        ))
    }

    /// Computes the month's alerts and hands each one to the sink.
    ///
    /// Returns how many were dispatched.
    pub async fn dispatch_alerts(&self, owner: UserId, year: i32, month: u32) -> StoreResult<usize> {
        let Some(budget) = self.find_for_period(owner, year, month).await? else {
            return Ok(0);
        };
        let alerts = self.budget_alerts(owner, year, month, None).await?;
        let budget_id = BudgetId::from_uuid(budget.budget.id);
        let count = alerts.len();

        for alert in alerts {
            self.sink.dispatch(Notification::BudgetAlert {
                owner,
                budget_id,
                alert,
            });
        }
        if count > 0 {
            tracing::info!(%budget_id, count, "budget alerts dispatched");
        }
        Ok(count)
    }

    /// Advises whether an expense would break its category cap.
    ///
    /// Never fails for a missing budget or cap: the result is then
    /// unrestricted. Use [`BudgetCheck::enforce`] to block on refusal.
    pub async fn check_budget_before_transaction(
        &self,
        owner: UserId,
        category_id: CategoryId,
        amount: Decimal,
        date: NaiveDate,
    ) -> StoreResult<BudgetCheck> {
        let period = BudgetPeriod::containing(date);
        let Some(budget) = self.find_for_period(owner, period.year, period.month).await? else {
            return Ok(BudgetCheck::unrestricted());
        };
        let definition = definition_of(&self.db, &budget).await?;
        let cap = definition
            .caps
            .iter()
            .find(|cap| cap.category_id == category_id);
        let Some(cap) = cap else {
            return Ok(BudgetCheck::unrestricted());
        };

        let spent: Decimal = self
            .expense_lines(owner, period)
            .await?
            .iter()
            .filter(|line| line.category_id == Some(category_id))
            .map(|line| line.amount)
            .sum();

        Ok(BudgetService::check_before_transaction(
            Some(cap),
            spent,
            amount,
            self.config.budget_warning_threshold,
        ))
    }

    /// Cap totals and over/near-budget counts for a month.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the owner has no budget for the month.
    pub async fn budget_summary(&self, owner: UserId, year: i32, month: u32) -> StoreResult<BudgetSummary> {
        let budget = self
            .find_for_period(owner, year, month)
            .await?
            .ok_or_else(|| StoreError::not_found("Budget not found"))?;
        let definition = definition_of(&self.db, &budget).await?;
        let lines = self.expense_lines(owner, definition.period).await?;
        let usage = BudgetService::calculate_usage(&definition, &lines);
        Ok(BudgetService::summary(&definition, usage))
    }

    async fn period_budget(
        &self,
        owner: UserId,
        period: BudgetPeriod,
    ) -> StoreResult<Option<budgets::Model>> {
        Ok(budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(owner.into_inner()))
            .filter(budgets::Column::Year.eq(period.year))
            .filter(budgets::Column::Month.eq(period.month.cast_signed()))
            .one(&self.db)
            .await?)
    }

    async fn resolve_caps(
        &self,
        owner: UserId,
        requested: &[BudgetCapInput],
    ) -> StoreResult<Vec<CategoryCap>> {
        let mut caps = Vec::with_capacity(requested.len());
        for cap in requested {
            let category = visible_category(&self.db, owner, cap.category_id.into_inner()).await?;
            caps.push(CategoryCap {
                category_id: cap.category_id,
                name: category.name,
                cap: cap.cap_amount,
            });
        }
        Ok(caps)
    }

    /// Expenses in the period, pending ones included.
    async fn expense_lines(&self, owner: UserId, period: BudgetPeriod) -> StoreResult<Vec<ExpenseLine>> {
        let first = period.first_day().map_err(AppError::from)?;
        let last = period.last_day().map_err(AppError::from)?;

        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(owner.into_inner()))
            .filter(
                transactions::Column::TransactionType
                    .eq(TransactionType::from(CoreTransactionType::Expense)),
            )
            .filter(transactions::Column::TransactionDate.between(first, last))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ExpenseLine {
                category_id: row.category_id.map(CategoryId::from_uuid),
                amount: row.amount,
                date: row.transaction_date,
            })
            .collect())
    }
}

async fn find_owned_budget<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    budget_id: Uuid,
) -> StoreResult<budgets::Model> {
    budgets::Entity::find_by_id(budget_id)
        .filter(budgets::Column::UserId.eq(owner.into_inner()))
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Budget not found"))
}

async fn with_categories<C: ConnectionTrait>(
    conn: &C,
    budget: budgets::Model,
) -> StoreResult<BudgetWithCategories> {
    let categories = budget_categories::Entity::find()
        .filter(budget_categories::Column::BudgetId.eq(budget.id))
        .order_by_asc(budget_categories::Column::CreatedAt)
        .all(conn)
        .await?;
    Ok(BudgetWithCategories { budget, categories })
}

async fn insert_caps<C: ConnectionTrait>(
    conn: &C,
    budget_id: Uuid,
    caps: &[CategoryCap],
) -> Result<Vec<budget_categories::Model>, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut inserted = Vec::with_capacity(caps.len());
    for cap in caps {
        let row = budget_categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            budget_id: Set(budget_id),
            category_id: Set(cap.category_id.into_inner()),
            cap_amount: Set(cap.cap),
            created_at: Set(now),
        }
        .insert(conn)
        .await?;
        inserted.push(row);
    }
    Ok(inserted)
}

/// Stored caps with their category names.
async fn cap_definitions<C: ConnectionTrait>(
    conn: &C,
    rows: &[budget_categories::Model],
) -> StoreResult<Vec<CategoryCap>> {
    let names: HashMap<Uuid, String> = categories::Entity::find()
        .filter(categories::Column::Id.is_in(rows.iter().map(|row| row.category_id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect();

    Ok(rows
        .iter()
        .map(|row| CategoryCap {
            category_id: CategoryId::from_uuid(row.category_id),
            name: names.get(&row.category_id).cloned().unwrap_or_default(),
            cap: row.cap_amount,
        })
        .collect())
}

async fn definition_of<C: ConnectionTrait>(
    conn: &C,
    budget: &BudgetWithCategories,
) -> StoreResult<BudgetDefinition> {
    Ok(BudgetDefinition {
        period: period_of(&budget.budget)?,
        amount_total: budget.budget.amount_total,
        caps: cap_definitions(conn, &budget.categories).await?,
    })
}

fn period_of(budget: &budgets::Model) -> StoreResult<BudgetPeriod> {
    BudgetPeriod::new(budget.year, budget.month.cast_unsigned())
        .map_err(|err| AppError::from(err).into())
}
