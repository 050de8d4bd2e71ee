//! Account repository for money accounts and their materialized balances.
//!
//! `balance_current` is only ever changed through [`apply_delta`], inside the
//! same database transaction as the ledger row that justifies the change.

use chrono::{NaiveDate, Utc};
use finnit_core::ledger::{LedgerService, replay};
use finnit_shared::AppError;
use finnit_shared::types::money::parse_currency;
use finnit_shared::types::{AccountId, UserId};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::required_name;
use super::transaction::{NewTransaction, insert_transaction, posting_of};
use crate::entities::{
    accounts, debts,
    sea_orm_active_enums::{AccountType, TransactionSource},
    transactions,
};
use crate::error::{StoreError, StoreResult};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Display name.
    pub name: String,
    /// Account kind.
    pub account_type: AccountType,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Opening balance; a non-zero value is booked as an opening transaction.
    pub initial_balance: Decimal,
    /// Free-form metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Input for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New name.
    pub name: Option<String>,
    /// New kind.
    pub account_type: Option<AccountType>,
    /// Replacement metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFilter {
    /// Filter by account kind.
    pub account_type: Option<AccountType>,
    /// Include archived accounts.
    pub include_archived: bool,
}

/// Input for a manual balance correction.
#[derive(Debug, Clone)]
pub struct AdjustBalanceInput {
    /// Signed correction; positive raises the balance.
    pub amount: Decimal,
    /// Reason shown on the adjustment transaction.
    pub description: Option<String>,
    /// Booking date.
    pub date: NaiveDate,
}

/// Stored balance compared with a full replay of the account's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Account.
    pub account_id: AccountId,
    /// Materialized `balance_current`.
    pub stored: Decimal,
    /// Sum of confirmed signed effects.
    pub replayed: Decimal,
    /// `stored - replayed`; zero when consistent.
    pub drift: Decimal,
}

impl Reconciliation {
    /// Whether the stored balance matches history.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.drift.is_zero()
    }
}

/// Account repository for CRUD operations and balance maintenance.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account, booking a non-zero opening balance as income or
    /// expense in the same unit of work.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank name, a bad currency code or a
    /// sub-cent opening balance.
    pub async fn create_account(
        &self,
        owner: UserId,
        input: CreateAccountInput,
    ) -> StoreResult<accounts::Model> {
        let name = required_name(&input.name, "Account")?;
        let currency = parse_currency(&input.currency)?;
        let opening = LedgerService::opening_posting(input.initial_balance)?;
        let now: DateTimeWithTimeZone = Utc::now().into();

        let txn = self.db.begin().await?;

        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(owner.into_inner()),
            name: Set(name),
            account_type: Set(input.account_type),
            currency: Set(currency.to_string()),
            balance_current: Set(opening.map_or(Decimal::ZERO, |(_, posting)| posting.applied_effect())),
            is_archived: Set(false),
            metadata: Set(input.metadata.unwrap_or_else(|| serde_json::json!({}))),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        if let Some((kind, posting)) = opening {
            insert_transaction(
                &txn,
                NewTransaction {
                    owner,
                    account_id: account.id,
                    category_id: None,
                    kind,
                    posting,
                    currency: &account.currency,
                    date: now.date_naive(),
                    description: Some("Initial balance".to_string()),
                    merchant_name: None,
                    source: TransactionSource::Manual,
                    external_id: None,
                },
            )
            .await?;
        }

        txn.commit().await?;

        tracing::info!(
            account_id = %account.id,
            balance = %account.balance_current,
            "account created"
        );
        Ok(account)
    }

    /// Finds an account owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the account does not exist or belongs to
    /// another user.
    pub async fn find_account(
        &self,
        owner: UserId,
        account_id: AccountId,
    ) -> StoreResult<accounts::Model> {
        find_owned_account(&self.db, owner, account_id.into_inner()).await
    }

    /// Lists the owner's accounts, oldest first.
    pub async fn list_accounts(
        &self,
        owner: UserId,
        filter: AccountFilter,
    ) -> StoreResult<Vec<accounts::Model>> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(owner.into_inner()))
            .order_by_asc(accounts::Column::CreatedAt);

        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(account_type));
        }
        if !filter.include_archived {
            query = query.filter(accounts::Column::IsArchived.eq(false));
        }

        Ok(query.all(&self.db).await?)
    }

    /// Updates name, kind or metadata. Balance and currency never change here.
    pub async fn update_account(
        &self,
        owner: UserId,
        account_id: AccountId,
        input: UpdateAccountInput,
    ) -> StoreResult<accounts::Model> {
        let account = self.find_account(owner, account_id).await?;
        let mut active: accounts::ActiveModel = account.into();

        if let Some(name) = input.name {
            active.name = Set(required_name(&name, "Account")?);
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type);
        }
        if let Some(metadata) = input.metadata {
            active.metadata = Set(metadata);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Hides an account from default listings. History is kept.
    pub async fn archive_account(
        &self,
        owner: UserId,
        account_id: AccountId,
    ) -> StoreResult<accounts::Model> {
        let account = self.find_account(owner, account_id).await?;
        let mut active: accounts::ActiveModel = account.into();
        active.is_archived = Set(true);
        active.updated_at = Set(Utc::now().into());
        let account = active.update(&self.db).await?;

        tracing::info!(account_id = %account.id, "account archived");
        Ok(account)
    }

    /// Deletes an account that has never been used.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when transactions or debts reference the account.
    pub async fn delete_account(&self, owner: UserId, account_id: AccountId) -> StoreResult<()> {
        let account = self.find_account(owner, account_id).await?;

        let transaction_count = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account.id))
            .count(&self.db)
            .await?;
        if transaction_count > 0 {
            return Err(AppError::Validation(
                "Cannot delete account with existing transactions".to_string(),
            )
            .into());
        }

        let debt_count = debts::Entity::find()
            .filter(debts::Column::AccountId.eq(account.id))
            .count(&self.db)
            .await?;
        if debt_count > 0 {
            return Err(
                AppError::Validation("Cannot delete account linked to a debt".to_string()).into(),
            );
        }

        accounts::Entity::delete_by_id(account.id).exec(&self.db).await?;
        tracing::info!(account_id = %account.id, "account deleted");
        Ok(())
    }

    /// Books a signed balance correction as an adjustment transaction.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero or sub-cent amount or an archived
    /// account, and `NotFound` for an account the caller does not own.
    pub async fn adjust_balance(
        &self,
        owner: UserId,
        account_id: AccountId,
        input: AdjustBalanceInput,
    ) -> StoreResult<accounts::Model> {
        let posting = LedgerService::prepare_adjustment(input.amount)?;

        let txn = self.db.begin().await?;
        let account = lock_owned_account(&txn, owner, account_id.into_inner()).await?;
        ensure_open(&account)?;

        insert_transaction(
            &txn,
            NewTransaction {
                owner,
                account_id: account.id,
                category_id: None,
                kind: finnit_core::ledger::TransactionType::Adjustment,
                posting,
                currency: &account.currency,
                date: input.date,
                description: input.description,
                merchant_name: None,
                source: TransactionSource::Manual,
                external_id: None,
            },
        )
        .await?;
        apply_delta(&txn, account.id, posting.applied_effect()).await?;

        let account = accounts::Entity::find_by_id(account.id)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found("Account not found"))?;
        txn.commit().await?;

        Ok(account)
    }

    /// Replays the account's history and compares it with the stored balance.
    pub async fn reconcile(&self, owner: UserId, account_id: AccountId) -> StoreResult<Reconciliation> {
        let account = self.find_account(owner, account_id).await?;

        let rows = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account.id))
            .all(&self.db)
            .await?;
        let postings: Vec<_> = rows.iter().map(posting_of).collect();
        let replayed = replay(&postings);
        let drift = account.balance_current - replayed;

        if !drift.is_zero() {
            tracing::warn!(account_id = %account.id, %drift, "account balance drift detected");
        }

        Ok(Reconciliation {
            account_id,
            stored: account.balance_current,
            replayed,
            drift,
        })
    }
}

/// Loads an owned account without locking it.
pub(crate) async fn find_owned_account<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    account_id: Uuid,
) -> StoreResult<accounts::Model> {
    accounts::Entity::find_by_id(account_id)
        .filter(accounts::Column::UserId.eq(owner.into_inner()))
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Account not found"))
}

/// Loads an owned account with `SELECT ... FOR UPDATE`.
pub(crate) async fn lock_owned_account<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    account_id: Uuid,
) -> StoreResult<accounts::Model> {
    accounts::Entity::find_by_id(account_id)
        .filter(accounts::Column::UserId.eq(owner.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Account not found"))
}

/// Rejects new postings on archived accounts.
pub(crate) fn ensure_open(account: &accounts::Model) -> Result<(), AppError> {
    if account.is_archived {
        return Err(AppError::Validation(format!(
            "Account {} is archived",
            account.name
        )));
    }
    Ok(())
}

/// Adds `delta` to `balance_current` as `balance_current = balance_current + delta`.
pub(crate) async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    delta: Decimal,
) -> Result<(), DbErr> {
    if delta.is_zero() {
        return Ok(());
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    accounts::Entity::update_many()
        .col_expr(
            accounts::Column::BalanceCurrent,
            Expr::col(accounts::Column::BalanceCurrent).add(delta),
        )
        .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
        .filter(accounts::Column::Id.eq(account_id))
        .exec(conn)
        .await?;

    tracing::debug!(%account_id, %delta, "account balance adjusted");
    Ok(())
}
