//! Debt repository: debts, their payments and payoff projections.
//!
//! The remaining balance is derived from the payment history and never
//! stored. Recording a payment locks the debt row so two concurrent payments
//! cannot both pass the overpayment check.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use finnit_core::debt::{
    DebtKind as CoreDebtKind, DebtPosition, DebtProjection, DebtService, DebtSummary,
    PayoffSchedule, PayoffStrategy, calculate_payoff_schedule,
};
use finnit_shared::AppError;
use finnit_shared::types::{AccountId, DebtId, TransactionId, UserId};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::account::find_owned_account;
use super::required_name;
use super::transaction::find_owned_transaction;
use crate::entities::{debt_payments, debts};
use crate::error::{StoreError, StoreResult};

/// Input for creating a debt.
#[derive(Debug, Clone)]
pub struct CreateDebtInput {
    /// Display name.
    pub name: String,
    /// Kind of debt.
    pub kind: CoreDebtKind,
    /// Amount originally owed.
    pub principal: Decimal,
    /// Annual interest rate in percent.
    pub interest_rate_annual: Option<Decimal>,
    /// Minimum monthly payment.
    pub min_payment_amount: Option<Decimal>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Account the debt is serviced from.
    pub account_id: Option<AccountId>,
}

/// Input for updating a debt. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct UpdateDebtInput {
    /// New name.
    pub name: Option<String>,
    /// New kind.
    pub kind: Option<CoreDebtKind>,
    /// New principal.
    pub principal: Option<Decimal>,
    /// New rate.
    pub interest_rate_annual: Option<Option<Decimal>>,
    /// New minimum payment.
    pub min_payment_amount: Option<Option<Decimal>>,
    /// New due date.
    pub due_date: Option<Option<NaiveDate>>,
    /// New linked account.
    pub account_id: Option<Option<AccountId>>,
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// The owner's transaction that paid it.
    pub transaction_id: TransactionId,
    /// Amount paid; must not exceed the remaining balance.
    pub amount: Decimal,
    /// Defaults to the transaction's date.
    pub payment_date: Option<NaiveDate>,
}

/// A debt with its derived balance.
#[derive(Debug, Clone, Serialize)]
pub struct DebtWithBalance {
    /// The debt row.
    pub debt: debts::Model,
    /// Σ payments.
    pub total_paid: Decimal,
    /// `max(0, principal − total_paid)`.
    pub remaining_balance: Decimal,
}

/// Debt repository.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    db: DatabaseConnection,
}

impl DebtRepository {
    /// Creates a new debt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a debt.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad terms and `NotFound` for a linked account
    /// the caller does not own.
    pub async fn create_debt(
        &self,
        owner: UserId,
        input: CreateDebtInput,
    ) -> StoreResult<DebtWithBalance> {
        let name = required_name(&input.name, "Debt")?;
        DebtService::validate_terms(
            input.principal,
            input.interest_rate_annual,
            input.min_payment_amount,
        )?;
        if let Some(account_id) = input.account_id {
            self.linked_account(owner, account_id).await?;
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let debt = debts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(owner.into_inner()),
            name: Set(name),
            kind: Set(input.kind.into()),
            principal: Set(input.principal),
            interest_rate_annual: Set(input.interest_rate_annual),
            min_payment_amount: Set(input.min_payment_amount),
            start_date: Set(input.start_date),
            due_date: Set(input.due_date),
            account_id: Set(input.account_id.map(AccountId::into_inner)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(debt_id = %debt.id, principal = %debt.principal, "debt created");
        Ok(DebtWithBalance {
            remaining_balance: debt.principal,
            debt,
            total_paid: Decimal::ZERO,
        })
    }

    /// Finds a debt with its derived balance.
    pub async fn find_debt(&self, owner: UserId, debt_id: DebtId) -> StoreResult<DebtWithBalance> {
        let debt = find_owned_debt(&self.db, owner, debt_id.into_inner()).await?;
        let total_paid = total_paid(&self.db, debt.id).await?;
        Ok(with_balance(debt, total_paid))
    }

    /// Lists the owner's debts, oldest first.
    pub async fn list_debts(&self, owner: UserId) -> StoreResult<Vec<DebtWithBalance>> {
        let rows = self.owned_debts(owner).await?;
        let paid = self.paid_by_debt(&rows).await?;
        Ok(rows
            .into_iter()
            .map(|debt| {
                let total_paid = paid.get(&debt.id).copied().unwrap_or_default();
                with_balance(debt, total_paid)
            })
            .collect())
    }

    /// Updates a debt's terms.
    pub async fn update_debt(
        &self,
        owner: UserId,
        debt_id: DebtId,
        input: UpdateDebtInput,
    ) -> StoreResult<DebtWithBalance> {
        let debt = find_owned_debt(&self.db, owner, debt_id.into_inner()).await?;

        let principal = input.principal.unwrap_or(debt.principal);
        let rate = input.interest_rate_annual.unwrap_or(debt.interest_rate_annual);
        let min_payment = input.min_payment_amount.unwrap_or(debt.min_payment_amount);
        DebtService::validate_terms(principal, rate, min_payment)?;
        if let Some(Some(account_id)) = input.account_id {
            self.linked_account(owner, account_id).await?;
        }

        let mut active: debts::ActiveModel = debt.into();
        if let Some(name) = input.name {
            active.name = Set(required_name(&name, "Debt")?);
        }
        if let Some(kind) = input.kind {
            active.kind = Set(kind.into());
        }
        active.principal = Set(principal);
        active.interest_rate_annual = Set(rate);
        active.min_payment_amount = Set(min_payment);
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        if let Some(account_id) = input.account_id {
            active.account_id = Set(account_id.map(AccountId::into_inner));
        }
        active.updated_at = Set(Utc::now().into());

        let debt = active.update(&self.db).await?;
        let total_paid = total_paid(&self.db, debt.id).await?;
        Ok(with_balance(debt, total_paid))
    }

    /// Deletes a debt that has no payments.
    pub async fn delete_debt(&self, owner: UserId, debt_id: DebtId) -> StoreResult<()> {
        let debt = find_owned_debt(&self.db, owner, debt_id.into_inner()).await?;
        let payments = debt_payments::Entity::find()
            .filter(debt_payments::Column::DebtId.eq(debt.id))
            .count(&self.db)
            .await?;
        DebtService::ensure_deletable(payments)?;

        debts::Entity::delete_by_id(debt.id).exec(&self.db).await?;
        tracing::info!(debt_id = %debt.id, "debt deleted");
        Ok(())
    }

    /// Records a payment against a debt.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a debt or transaction the caller does not own,
    /// `Validation` for a bad amount, and `DebtOverpayment` when the amount
    /// exceeds the remaining balance.
    pub async fn record_payment(
        &self,
        owner: UserId,
        debt_id: DebtId,
        input: RecordPaymentInput,
    ) -> StoreResult<debt_payments::Model> {
        find_owned_debt(&self.db, owner, debt_id.into_inner()).await?;
        let transaction =
            find_owned_transaction(&self.db, owner, input.transaction_id.into_inner()).await?;

        let txn = self.db.begin().await?;
        let debt = debts::Entity::find_by_id(debt_id.into_inner())
            .filter(debts::Column::UserId.eq(owner.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("Debt not found"))?;

        let paid = total_paid(&txn, debt.id).await?;
        let amount = DebtService::ensure_payment_allowed(&position(&debt, paid), input.amount)?;

        let payment = debt_payments::ActiveModel {
            id: Set(Uuid::now_v7()),
            debt_id: Set(debt.id),
            transaction_id: Set(transaction.id),
            amount: Set(amount),
            payment_date: Set(input.payment_date.unwrap_or(transaction.transaction_date)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            debt_id = %debt.id,
            payment_id = %payment.id,
            amount = %amount,
            remaining = %(debt.principal - paid - amount),
            "debt payment recorded"
        );
        Ok(payment)
    }

    /// Payments on a debt, newest first.
    pub async fn list_payments(
        &self,
        owner: UserId,
        debt_id: DebtId,
    ) -> StoreResult<Vec<debt_payments::Model>> {
        let debt = find_owned_debt(&self.db, owner, debt_id.into_inner()).await?;
        Ok(debt_payments::Entity::find()
            .filter(debt_payments::Column::DebtId.eq(debt.id))
            .order_by_desc(debt_payments::Column::PaymentDate)
            .order_by_desc(debt_payments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Projects one debt's payoff at `monthly_payment`, or its minimum.
    pub async fn payoff_schedule(
        &self,
        owner: UserId,
        debt_id: DebtId,
        monthly_payment: Option<Decimal>,
        today: NaiveDate,
    ) -> StoreResult<PayoffSchedule> {
        let debt = find_owned_debt(&self.db, owner, debt_id.into_inner()).await?;
        let paid = total_paid(&self.db, debt.id).await?;
        Ok(calculate_payoff_schedule(
            &position(&debt, paid),
            monthly_payment,
            today,
        ))
    }

    /// Projects paying off several debts with a rolling extra payment.
    ///
    /// An empty `debt_ids` selects all of the owner's debts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when any requested debt is not the caller's.
    pub async fn payoff_strategy(
        &self,
        owner: UserId,
        debt_ids: &[DebtId],
        extra_payment: Decimal,
        strategy: PayoffStrategy,
        today: NaiveDate,
    ) -> StoreResult<Vec<DebtProjection>> {
        let mut rows = self.owned_debts(owner).await?;
        if !debt_ids.is_empty() {
            let wanted: HashSet<DebtId> = debt_ids.iter().copied().collect();
            rows.retain(|debt| wanted.contains(&DebtId::from_uuid(debt.id)));
            if rows.len() != wanted.len() {
                return Err(StoreError::not_found("One or more debts not found"));
            }
        }

        let positions = self.positions(rows).await?;
        Ok(DebtService::calculate_payoff_strategy(
            &positions,
            extra_payment,
            strategy,
            today,
        ))
    }

    /// Totals and payoff projections across all of the owner's debts.
    pub async fn debt_summary(&self, owner: UserId, today: NaiveDate) -> StoreResult<DebtSummary> {
        let rows = self.owned_debts(owner).await?;
        let positions = self.positions(rows).await?;
        Ok(DebtService::summary(&positions, today))
    }

    async fn owned_debts(&self, owner: UserId) -> StoreResult<Vec<debts::Model>> {
        Ok(debts::Entity::find()
            .filter(debts::Column::UserId.eq(owner.into_inner()))
            .order_by_asc(debts::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn paid_by_debt(&self, rows: &[debts::Model]) -> StoreResult<HashMap<Uuid, Decimal>> {
        let payments = debt_payments::Entity::find()
            .filter(debt_payments::Column::DebtId.is_in(rows.iter().map(|debt| debt.id)))
            .all(&self.db)
            .await?;

        let mut paid: HashMap<Uuid, Decimal> = HashMap::new();
        for payment in payments {
            *paid.entry(payment.debt_id).or_default() += payment.amount;
        }
        Ok(paid)
    }

    async fn positions(&self, rows: Vec<debts::Model>) -> StoreResult<Vec<DebtPosition>> {
        let paid = self.paid_by_debt(&rows).await?;
        Ok(rows
            .iter()
            .map(|debt| position(debt, paid.get(&debt.id).copied().unwrap_or_default()))
            .collect())
    }

    async fn linked_account(&self, owner: UserId, account_id: AccountId) -> StoreResult<()> {
        match find_owned_account(&self.db, owner, account_id.into_inner()).await {
            Ok(_) => Ok(()),
            Err(StoreError::Domain(AppError::NotFound(_))) => {
                Err(StoreError::not_found("Linked account not found"))
            }
            Err(err) => Err(err),
        }
    }
}

async fn find_owned_debt<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    debt_id: Uuid,
) -> StoreResult<debts::Model> {
    debts::Entity::find_by_id(debt_id)
        .filter(debts::Column::UserId.eq(owner.into_inner()))
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Debt not found"))
}

async fn total_paid<C: ConnectionTrait>(conn: &C, debt_id: Uuid) -> StoreResult<Decimal> {
    Ok(debt_payments::Entity::find()
        .filter(debt_payments::Column::DebtId.eq(debt_id))
        .all(conn)
        .await?
        .iter()
        .map(|payment| payment.amount)
        .sum())
}

fn position(debt: &debts::Model, total_paid: Decimal) -> DebtPosition {
    DebtPosition {
        id: DebtId::from_uuid(debt.id),
        name: debt.name.clone(),
        principal: debt.principal,
        total_paid,
        interest_rate_annual: debt.interest_rate_annual,
        min_payment: debt.min_payment_amount,
    }
}

fn with_balance(debt: debts::Model, total_paid: Decimal) -> DebtWithBalance {
    let remaining_balance = position(&debt, total_paid).remaining();
    DebtWithBalance {
        debt,
        total_paid,
        remaining_balance,
    }
}
