//! Report repository: monthly totals and balance projections.
//!
//! Reports are read-only. Pending transactions count toward income and
//! expenses, the same way budgets count them.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};
use finnit_core::ledger::TransactionType as CoreTransactionType;
use finnit_core::reports::{
    FlowLine, HISTORY_MONTHS, MonthlyReport, ProjectionPoint, ReportError, ReportService,
    WhatIfInput, WhatIfResult,
};
use finnit_shared::AppError;
use finnit_shared::types::{CategoryId, UserId};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{accounts, categories, sea_orm_active_enums::TransactionType, transactions};
use crate::error::StoreResult;

/// Currency reported for an owner without accounts.
const DEFAULT_REPORT_CURRENCY: &str = "USD";

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Income, expenses and the category breakdown for a calendar month.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an invalid month.
    pub async fn monthly_report(&self, owner: UserId, year: i32, month: u32) -> StoreResult<MonthlyReport> {
        let (first, last) = ReportService::month_bounds(year, month).map_err(AppError::from)?;
        let lines = self.flow_lines(owner, first, last).await?;

        let category_ids: Vec<Uuid> = lines
            .iter()
            .filter_map(|line| line.category_id.map(CategoryId::into_inner))
            .collect();
        let category_names: HashMap<CategoryId, String> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            categories::Entity::find()
                .filter(categories::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|category| (CategoryId::from_uuid(category.id), category.name))
                .collect()
        };

        let currency = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(owner.into_inner()))
            .order_by_asc(accounts::Column::CreatedAt)
            .one(&self.db)
            .await?
            .map_or_else(|| DEFAULT_REPORT_CURRENCY.to_string(), |account| account.currency);

        let report = ReportService::monthly_report(year, month, &currency, &lines, &category_names)
            .map_err(AppError::from)?;
        tracing::debug!(
            %owner,
            year,
            month,
            income = %report.total_income,
            expenses = %report.total_expenses,
            "monthly report built"
        );
        Ok(report)
    }

    /// Projects the total balance of unarchived accounts `months` ahead,
    /// using the average income and expenses of the last six months.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a projection length outside the supported
    /// range.
    pub async fn cash_flow_projection(
        &self,
        owner: UserId,
        months: u32,
        today: NaiveDate,
    ) -> StoreResult<Vec<ProjectionPoint>> {
        let balance = self.open_balance(owner).await?;
        let window_start = today
            .checked_sub_months(Months::new(HISTORY_MONTHS))
            .ok_or_else(|| AppError::from(ReportError::DateOutOfRange))?;
        let lines = self.flow_lines(owner, window_start, today).await?;
        let flow = ReportService::average_flow(&lines, today, HISTORY_MONTHS);

        let points = ReportService::cash_flow_projection(balance, flow, today, months)
            .map_err(AppError::from)?;
        Ok(points)
    }

    /// Plays a hypothetical monthly income and expense forward from the
    /// total balance of unarchived accounts.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank scenario name, negative amounts or an
    /// unsupported projection length.
    pub async fn what_if_scenario(&self, owner: UserId, input: &WhatIfInput) -> StoreResult<WhatIfResult> {
        let balance = self.open_balance(owner).await?;
        let result = ReportService::what_if(balance, input).map_err(AppError::from)?;
        tracing::debug!(
            %owner,
            scenario = %result.scenario_name,
            final_balance = %result.final_balance,
            "what-if scenario run"
        );
        Ok(result)
    }

    /// Sum of `balance_current` over the owner's unarchived accounts.
    async fn open_balance(&self, owner: UserId) -> StoreResult<Decimal> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(owner.into_inner()))
            .filter(accounts::Column::IsArchived.eq(false))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|account| account.balance_current)
            .sum())
    }

    /// Income and expense rows dated within `from..=to`.
    async fn flow_lines(&self, owner: UserId, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<FlowLine>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(owner.into_inner()))
            .filter(transactions::Column::TransactionType.is_in([
                TransactionType::from(CoreTransactionType::Income),
                TransactionType::from(CoreTransactionType::Expense),
            ]))
            .filter(transactions::Column::TransactionDate.between(from, to))
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| FlowLine {
                kind: row.transaction_type.into(),
                category_id: row.category_id.map(CategoryId::from_uuid),
                amount: row.amount,
                date: row.transaction_date,
            })
            .collect())
    }
}
