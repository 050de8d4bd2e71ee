//! Transfer repository: moves money between two accounts of one owner.
//!
//! Both legs, the transfer row and both balance deltas are written in one
//! database transaction. The accounts are locked in id order and the plan is
//! recomputed from the locked rows before anything is written.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use finnit_core::ledger::TransactionType as CoreTransactionType;
use finnit_core::transfer::{AccountSnapshot, TransferLeg, TransferPlanner, lock_order};
use finnit_shared::AppError;
use finnit_shared::types::money::parse_currency;
use finnit_shared::types::{AccountId, TransferId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::account::{apply_delta, ensure_open, find_owned_account, lock_owned_account};
use super::transaction::{NewTransaction, find_owned_transaction, insert_transaction};
use crate::entities::{
    accounts,
    sea_orm_active_enums::{TransactionSource, TransactionType},
    transactions, transfers,
};
use crate::error::{StoreError, StoreResult};

/// Input for creating a transfer.
#[derive(Debug, Clone)]
pub struct CreateTransferInput {
    /// Account the money leaves.
    pub from_account_id: AccountId,
    /// Account the money arrives in.
    pub to_account_id: AccountId,
    /// Positive amount.
    pub amount: Decimal,
    /// Defaults to `Transfer to {destination}`.
    pub description: Option<String>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

/// Filter options for listing transfers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferFilter {
    /// Transfers touching this account on either side.
    pub account_id: Option<AccountId>,
    /// Inclusive start date of the outgoing leg.
    pub from: Option<NaiveDate>,
    /// Inclusive end date of the outgoing leg.
    pub to: Option<NaiveDate>,
}

/// A transfer with both of its legs.
#[derive(Debug, Clone, Serialize)]
pub struct TransferWithLegs {
    /// The transfer row.
    pub transfer: transfers::Model,
    /// Outflow on the source account.
    pub outgoing: transactions::Model,
    /// Inflow on the destination account.
    pub incoming: transactions::Model,
}

/// Transfer repository.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a transfer and both of its legs.
    ///
    /// # Errors
    ///
    /// Checked in order, before any write:
    /// 1. `TransferSameAccount` when source and destination are equal
    /// 2. `NotFound` for a source or destination the caller does not own
    /// 3. `Validation` for archived accounts or differing currencies
    /// 4. `InsufficientBalance` when the source balance is below the amount
    /// 5. `Validation` for a non-positive or sub-cent amount
    pub async fn create_transfer(
        &self,
        owner: UserId,
        input: CreateTransferInput,
    ) -> StoreResult<TransferWithLegs> {
        TransferPlanner::ensure_distinct(input.from_account_id, input.to_account_id)?;

        let from = owned_side(&self.db, owner, input.from_account_id, "Source account not found").await?;
        let to = owned_side(&self.db, owner, input.to_account_id, "Destination account not found").await?;
        ensure_open(&from)?;
        ensure_open(&to)?;
        TransferPlanner::plan(
            &snapshot(&from)?,
            &snapshot(&to)?,
            input.amount,
            input.description.as_deref(),
        )?;

        let txn = self.db.begin().await?;

        let mut locked: HashMap<AccountId, accounts::Model> = HashMap::with_capacity(2);
        for account_id in lock_order(input.from_account_id, input.to_account_id) {
            let account = lock_owned_account(&txn, owner, account_id.into_inner()).await?;
            locked.insert(account_id, account);
        }
        let (Some(from), Some(to)) = (
            locked.get(&input.from_account_id),
            locked.get(&input.to_account_id),
        ) else {
            return Err(StoreError::not_found("Account not found"));
        };
        ensure_open(from)?;
        ensure_open(to)?;

        let plan = TransferPlanner::plan(
            &snapshot(from)?,
            &snapshot(to)?,
            input.amount,
            input.description.as_deref(),
        )?;
        let date = input.date.unwrap_or_else(|| Utc::now().date_naive());
        let currency = plan.currency.to_string();

        let outgoing = insert_leg(&txn, owner, &plan.outgoing, &currency, date).await?;
        let incoming = insert_leg(&txn, owner, &plan.incoming, &currency, date).await?;

        let transfer = transfers::ActiveModel {
            id: Set(Uuid::now_v7()),
            from_transaction_id: Set(outgoing.id),
            to_transaction_id: Set(incoming.id),
            amount: Set(plan.amount),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        apply_delta(&txn, outgoing.account_id, plan.outgoing.delta()).await?;
        apply_delta(&txn, incoming.account_id, plan.incoming.delta()).await?;

        txn.commit().await?;

        tracing::info!(
            transfer_id = %transfer.id,
            from = %outgoing.account_id,
            to = %incoming.account_id,
            amount = %transfer.amount,
            "transfer created"
        );
        Ok(TransferWithLegs {
            transfer,
            outgoing,
            incoming,
        })
    }

    /// Finds a transfer whose outgoing leg belongs to `owner`.
    pub async fn find_transfer(
        &self,
        owner: UserId,
        transfer_id: TransferId,
    ) -> StoreResult<TransferWithLegs> {
        let transfer = transfers::Entity::find_by_id(transfer_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::not_found("Transfer not found"))?;

        let outgoing = match find_owned_transaction(&self.db, owner, transfer.from_transaction_id).await {
            Ok(leg) => leg,
            Err(StoreError::Domain(AppError::NotFound(_))) => {
                return Err(StoreError::not_found("Transfer not found"));
            }
            Err(err) => return Err(err),
        };
        let incoming = find_owned_transaction(&self.db, owner, transfer.to_transaction_id).await?;

        Ok(TransferWithLegs {
            transfer,
            outgoing,
            incoming,
        })
    }

    /// Lists the owner's transfers, newest first.
    pub async fn list_transfers(
        &self,
        owner: UserId,
        filter: TransferFilter,
    ) -> StoreResult<Vec<TransferWithLegs>> {
        let legs: HashMap<Uuid, transactions::Model> = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(owner.into_inner()))
            .filter(
                transactions::Column::TransactionType
                    .eq(TransactionType::from(CoreTransactionType::Transfer)),
            )
            .all(&self.db)
            .await?
            .into_iter()
            .map(|leg| (leg.id, leg))
            .collect();

        let rows = transfers::Entity::find()
            .filter(transfers::Column::FromTransactionId.is_in(legs.keys().copied()))
            .order_by_desc(transfers::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let listed = rows
            .into_iter()
            .filter_map(|transfer| {
                let outgoing = legs.get(&transfer.from_transaction_id)?.clone();
                let incoming = legs.get(&transfer.to_transaction_id)?.clone();
                Some(TransferWithLegs {
                    transfer,
                    outgoing,
                    incoming,
                })
            })
            .filter(|item| {
                filter.account_id.is_none_or(|account_id| {
                    let account_id = account_id.into_inner();
                    item.outgoing.account_id == account_id || item.incoming.account_id == account_id
                })
            })
            .filter(|item| filter.from.is_none_or(|from| item.outgoing.transaction_date >= from))
            .filter(|item| filter.to.is_none_or(|to| item.outgoing.transaction_date <= to))
            .collect();

        Ok(listed)
    }
}

async fn owned_side<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    account_id: AccountId,
    missing: &str,
) -> StoreResult<accounts::Model> {
    match find_owned_account(conn, owner, account_id.into_inner()).await {
        Err(StoreError::Domain(AppError::NotFound(_))) => Err(StoreError::not_found(missing)),
        other => other,
    }
}

fn snapshot(account: &accounts::Model) -> StoreResult<AccountSnapshot> {
    Ok(AccountSnapshot {
        id: AccountId::from_uuid(account.id),
        name: account.name.clone(),
        currency: parse_currency(&account.currency)?,
        balance: account.balance_current,
    })
}

async fn insert_leg<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    leg: &TransferLeg,
    currency: &str,
    date: NaiveDate,
) -> Result<transactions::Model, sea_orm::DbErr> {
    insert_transaction(
        conn,
        NewTransaction {
            owner,
            account_id: leg.account_id.into_inner(),
            category_id: None,
            kind: CoreTransactionType::Transfer,
            posting: leg.posting,
            currency,
            date,
            description: Some(leg.description.clone()),
            merchant_name: None,
            source: TransactionSource::Manual,
            external_id: None,
        },
    )
    .await
}
