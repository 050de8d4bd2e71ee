//! Transaction repository for ledger transaction database operations.
//!
//! Every write here follows the same shape: read the owned rows, ask
//! [`LedgerService`] for the posting and balance delta, then write the row and
//! apply the delta to the locked account inside one database transaction.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use finnit_core::ledger::validation::ensure_amendable;
use finnit_core::ledger::{
    AmendScope, Amendment, FlowDirection as CoreFlowDirection, LedgerService, LinkedRecords,
    Posting, TransactionSummary, TransactionType as CoreTransactionType, summarize,
};
use finnit_shared::types::money::parse_currency;
use finnit_shared::types::{AccountId, CategoryId, PageRequest, PageResponse, TransactionId, UserId};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::account::{apply_delta, ensure_open, find_owned_account, lock_owned_account};
use super::category::visible_category;
use super::contains_pattern;
use super::suggestion::{CategorySuggester, HistoryCategorySuggester};
use crate::entities::{
    accounts, debt_payments, goal_contributions,
    sea_orm_active_enums::{FlowDirection, TransactionSource, TransactionType},
    transactions, transfers,
};
use crate::error::{StoreError, StoreResult};

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Account the transaction posts to.
    pub account_id: AccountId,
    /// Optional category; suggested from the merchant when absent.
    pub category_id: Option<CategoryId>,
    /// Income, expense or adjustment. Transfers go through the transfer repository.
    pub transaction_type: CoreTransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Must equal the account currency.
    pub currency: String,
    /// Booking date.
    pub date: NaiveDate,
    /// Free text.
    pub description: Option<String>,
    /// Merchant name.
    pub merchant_name: Option<String>,
    /// Pending transactions do not move the balance.
    pub is_pending: bool,
    /// Required for adjustments; implied for income and expense.
    pub direction: Option<CoreFlowDirection>,
}

/// Input for updating a transaction.
///
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    /// New category.
    pub category_id: Option<Option<CategoryId>>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New type.
    pub transaction_type: Option<CoreTransactionType>,
    /// New direction.
    pub direction: Option<CoreFlowDirection>,
    /// New booking date.
    pub date: Option<NaiveDate>,
    /// New merchant name.
    pub merchant_name: Option<Option<String>>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by account.
    pub account_id: Option<AccountId>,
    /// Filter by category.
    pub category_id: Option<CategoryId>,
    /// Filter by type.
    pub transaction_type: Option<CoreTransactionType>,
    /// Inclusive start date.
    pub from: Option<NaiveDate>,
    /// Inclusive end date.
    pub to: Option<NaiveDate>,
    /// Filter by pending flag.
    pub is_pending: Option<bool>,
    /// Case-insensitive match on description or merchant.
    pub search: Option<String>,
}

/// One row of a bank import.
#[derive(Debug, Clone)]
pub struct ImportTransactionInput {
    /// The transaction itself.
    pub input: CreateTransactionInput,
    /// Identifier from the bank; rows already imported on the account are skipped.
    pub external_id: Option<String>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone)]
pub struct BulkImportResult {
    /// Inserted rows.
    pub imported: Vec<transactions::Model>,
    /// Rows skipped as duplicates.
    pub skipped: usize,
}

/// Transaction repository for CRUD operations and balance maintenance.
#[derive(Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
    suggester: Arc<dyn CategorySuggester>,
}

impl std::fmt::Debug for TransactionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionRepository").finish_non_exhaustive()
    }
}

impl TransactionRepository {
    /// Creates a repository that suggests categories from merchant history.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let suggester = Arc::new(HistoryCategorySuggester::new(db.clone()));
        Self { db, suggester }
    }

    /// Creates a repository with a custom category suggester.
    #[must_use]
    pub fn with_suggester(db: DatabaseConnection, suggester: Arc<dyn CategorySuggester>) -> Self {
        Self { db, suggester }
    }

    /// Creates a transaction and applies its balance effect.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `NotFound` for an account or category the caller cannot see
    /// - `Validation` for an archived account, a bad amount, a direction that
    ///   contradicts the type, a transfer type, or a currency mismatch
    pub async fn create_transaction(
        &self,
        owner: UserId,
        input: CreateTransactionInput,
    ) -> StoreResult<transactions::Model> {
        let account = find_owned_account(&self.db, owner, input.account_id.into_inner()).await?;
        ensure_open(&account)?;
        let category_id = self
            .resolve_category(owner, input.category_id, input.merchant_name.as_deref())
            .await?;
        let posting = prepare_posting(&account, &input)?;

        let txn = self.db.begin().await?;
        let account = lock_owned_account(&txn, owner, account.id).await?;

        let transaction = insert_transaction(
            &txn,
            NewTransaction {
                owner,
                account_id: account.id,
                category_id,
                kind: input.transaction_type,
                posting,
                currency: &account.currency,
                date: input.date,
                description: input.description,
                merchant_name: input.merchant_name,
                source: TransactionSource::Manual,
                external_id: None,
            },
        )
        .await?;
        apply_delta(&txn, account.id, posting.applied_effect()).await?;

        txn.commit().await?;

        tracing::info!(
            transaction_id = %transaction.id,
            account_id = %account.id,
            amount = %transaction.amount,
            pending = transaction.is_pending,
            "transaction created"
        );
        Ok(transaction)
    }

    /// Finds a transaction owned by `owner`.
    pub async fn find_transaction(
        &self,
        owner: UserId,
        transaction_id: TransactionId,
    ) -> StoreResult<transactions::Model> {
        find_owned_transaction(&self.db, owner, transaction_id.into_inner()).await
    }

    /// Lists transactions, newest first.
    pub async fn list_transactions(
        &self,
        owner: UserId,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> StoreResult<PageResponse<transactions::Model>> {
        let mut query =
            transactions::Entity::find().filter(transactions::Column::UserId.eq(owner.into_inner()));

        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id.into_inner()));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id.into_inner()));
        }
        if let Some(kind) = filter.transaction_type {
            query = query.filter(transactions::Column::TransactionType.eq(TransactionType::from(kind)));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::TransactionDate.lte(to));
        }
        if let Some(is_pending) = filter.is_pending {
            query = query.filter(transactions::Column::IsPending.eq(is_pending));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(&search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(transactions::Column::Description)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(transactions::Column::MerchantName)))
                            .like(pattern),
                    ),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Amends a transaction and applies the difference in balance effect.
    ///
    /// Imported transactions accept category and description changes only.
    /// Transfer legs keep their amount, type and direction.
    pub async fn update_transaction(
        &self,
        owner: UserId,
        transaction_id: TransactionId,
        input: UpdateTransactionInput,
    ) -> StoreResult<transactions::Model> {
        if let Some(Some(category_id)) = input.category_id {
            visible_category(&self.db, owner, category_id.into_inner()).await?;
        }

        let txn = self.db.begin().await?;
        let current = lock_owned_transaction(&txn, owner, transaction_id.into_inner()).await?;
        let account = lock_owned_account(&txn, owner, current.account_id).await?;
        ensure_open(&account)?;
        let links = linked_records(&txn, current.id).await?;

        let amendment = Amendment {
            amount: input.amount,
            kind: input.transaction_type,
            direction: input.direction,
            touches_details: input.date.is_some() || input.merchant_name.is_some(),
        };
        let amended = LedgerService::prepare_amendment(
            current.transaction_type.into(),
            posting_of(&current),
            current.source.into(),
            &links,
            &amendment,
        )?;

        let account_id = current.account_id;
        let mut active: transactions::ActiveModel = current.into();
        active.transaction_type = Set(amended.kind.into());
        active.amount = Set(amended.posting.amount);
        active.direction = Set(amended.posting.direction.into());
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id.map(CategoryId::into_inner));
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(date) = input.date {
            active.transaction_date = Set(date);
        }
        if let Some(merchant_name) = input.merchant_name {
            active.merchant_name = Set(merchant_name);
        }
        active.updated_at = Set(Utc::now().into());

        let transaction = active.update(&txn).await?;
        apply_delta(&txn, account_id, amended.delta).await?;
        txn.commit().await?;

        tracing::info!(
            transaction_id = %transaction.id,
            delta = %amended.delta,
            "transaction updated"
        );
        Ok(transaction)
    }

    /// Changes only the category. Allowed for imported rows and transfer legs.
    pub async fn recategorize(
        &self,
        owner: UserId,
        transaction_id: TransactionId,
        category_id: Option<CategoryId>,
    ) -> StoreResult<transactions::Model> {
        self.update_transaction(
            owner,
            transaction_id,
            UpdateTransactionInput {
                category_id: Some(category_id),
                ..UpdateTransactionInput::default()
            },
        )
        .await
    }

    /// Confirms or un-confirms a transaction.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for imported rows and transfer legs, whose
    /// confirmation state follows their source.
    pub async fn set_pending(
        &self,
        owner: UserId,
        transaction_id: TransactionId,
        is_pending: bool,
    ) -> StoreResult<transactions::Model> {
        let txn = self.db.begin().await?;
        let current = lock_owned_transaction(&txn, owner, transaction_id.into_inner()).await?;
        if current.is_pending == is_pending {
            return Ok(current);
        }
        let account = lock_owned_account(&txn, owner, current.account_id).await?;
        ensure_open(&account)?;

        let links = linked_records(&txn, current.id).await?;
        ensure_amendable(current.source.into(), &links, AmendScope::Posting)
            .map_err(finnit_shared::AppError::from)?;

        let delta = LedgerService::pending_delta(posting_of(&current), is_pending);
        let account_id = current.account_id;
        let mut active: transactions::ActiveModel = current.into();
        active.is_pending = Set(is_pending);
        active.updated_at = Set(Utc::now().into());

        let transaction = active.update(&txn).await?;
        apply_delta(&txn, account_id, delta).await?;
        txn.commit().await?;

        tracing::info!(
            transaction_id = %transaction.id,
            pending = is_pending,
            %delta,
            "transaction pending state changed"
        );
        Ok(transaction)
    }

    /// Deletes a transaction and reverses its balance effect.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for imported rows, transfer legs, and transactions
    /// referenced by a debt payment or goal contribution.
    pub async fn delete_transaction(
        &self,
        owner: UserId,
        transaction_id: TransactionId,
    ) -> StoreResult<()> {
        let txn = self.db.begin().await?;
        let current = lock_owned_transaction(&txn, owner, transaction_id.into_inner()).await?;
        lock_owned_account(&txn, owner, current.account_id).await?;

        let links = linked_records(&txn, current.id).await?;
        let delta = LedgerService::prepare_delete(posting_of(&current), current.source.into(), &links)?;

        transactions::Entity::delete_by_id(current.id).exec(&txn).await?;
        apply_delta(&txn, current.account_id, delta).await?;
        txn.commit().await?;

        tracing::info!(transaction_id = %current.id, %delta, "transaction deleted");
        Ok(())
    }

    /// Imports a batch of bank transactions in one unit of work.
    ///
    /// Every row is validated before anything is written; one bad row rejects
    /// the batch. Rows whose `external_id` already exists on the account are
    /// skipped.
    pub async fn bulk_import(
        &self,
        owner: UserId,
        rows: Vec<ImportTransactionInput>,
    ) -> StoreResult<BulkImportResult> {
        let mut accounts_by_id: HashMap<Uuid, accounts::Model> = HashMap::new();
        let mut planned = Vec::with_capacity(rows.len());

        for row in rows {
            let account_id = row.input.account_id.into_inner();
            if !accounts_by_id.contains_key(&account_id) {
                let account = find_owned_account(&self.db, owner, account_id).await?;
                ensure_open(&account)?;
                accounts_by_id.insert(account_id, account);
            }
            let Some(account) = accounts_by_id.get(&account_id) else {
                continue;
            };
            let posting = prepare_posting(account, &row.input)?;
            let category_id = self
                .resolve_category(owner, row.input.category_id, row.input.merchant_name.as_deref())
                .await?;
            planned.push((row, posting, category_id));
        }

        let txn = self.db.begin().await?;

        let lock_order: BTreeSet<Uuid> = accounts_by_id.keys().copied().collect();
        for account_id in &lock_order {
            lock_owned_account(&txn, owner, *account_id).await?;
        }

        let mut seen: HashSet<(Uuid, String)> = HashSet::new();
        let mut deltas: HashMap<Uuid, Decimal> = HashMap::new();
        let mut imported = Vec::with_capacity(planned.len());
        let mut skipped = 0;

        for (row, posting, category_id) in planned {
            let account_id = row.input.account_id.into_inner();
            if let Some(external_id) = &row.external_id {
                let exists = transactions::Entity::find()
                    .filter(transactions::Column::AccountId.eq(account_id))
                    .filter(transactions::Column::ExternalId.eq(external_id.as_str()))
                    .count(&txn)
                    .await?
                    > 0;
                if exists || !seen.insert((account_id, external_id.clone())) {
                    skipped += 1;
                    continue;
                }
            }

            let currency = accounts_by_id
                .get(&account_id)
                .map_or_else(String::new, |account| account.currency.clone());
            let transaction = insert_transaction(
                &txn,
                NewTransaction {
                    owner,
                    account_id,
                    category_id,
                    kind: row.input.transaction_type,
                    posting,
                    currency: &currency,
                    date: row.input.date,
                    description: row.input.description,
                    merchant_name: row.input.merchant_name,
                    source: TransactionSource::Imported,
                    external_id: row.external_id,
                },
            )
            .await?;
            *deltas.entry(account_id).or_default() += posting.applied_effect();
            imported.push(transaction);
        }

        for account_id in &lock_order {
            if let Some(delta) = deltas.get(account_id) {
                apply_delta(&txn, *account_id, *delta).await?;
            }
        }
        txn.commit().await?;

        tracing::info!(imported = imported.len(), skipped, "bulk import completed");
        Ok(BulkImportResult { imported, skipped })
    }

    /// Income and expense totals over an inclusive date range.
    pub async fn summary(
        &self,
        owner: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<TransactionSummary> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(owner.into_inner()))
            .filter(transactions::Column::TransactionDate.between(from, to))
            .all(&self.db)
            .await?;

        let lines: Vec<(CoreTransactionType, Posting)> = rows
            .iter()
            .map(|row| (row.transaction_type.into(), posting_of(row)))
            .collect();
        Ok(summarize(lines.iter().map(|(kind, posting)| (*kind, posting))))
    }

    async fn resolve_category(
        &self,
        owner: UserId,
        requested: Option<CategoryId>,
        merchant_name: Option<&str>,
    ) -> StoreResult<Option<Uuid>> {
        if let Some(category_id) = requested {
            let category = visible_category(&self.db, owner, category_id.into_inner()).await?;
            return Ok(Some(category.id));
        }
        let Some(merchant_name) = merchant_name else {
            return Ok(None);
        };
        let suggested = self.suggester.suggest(owner, merchant_name).await;
        if let Some(category_id) = suggested {
            tracing::debug!(%category_id, merchant_name, "category suggested");
        }
        Ok(suggested.map(CategoryId::into_inner))
    }
}

// ============================================================================
// Shared helpers for repositories that post transactions
// ============================================================================

/// A validated transaction row ready to insert.
pub(crate) struct NewTransaction<'a> {
    pub owner: UserId,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub kind: CoreTransactionType,
    pub posting: Posting,
    pub currency: &'a str,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub merchant_name: Option<String>,
    pub source: TransactionSource,
    pub external_id: Option<String>,
}

/// Inserts a transaction row. The caller applies the balance delta.
pub(crate) async fn insert_transaction<C: ConnectionTrait>(
    conn: &C,
    new: NewTransaction<'_>,
) -> Result<transactions::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    transactions::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(new.owner.into_inner()),
        account_id: Set(new.account_id),
        category_id: Set(new.category_id),
        transaction_type: Set(new.kind.into()),
        direction: Set(new.posting.direction.into()),
        amount: Set(new.posting.amount),
        currency: Set(new.currency.to_string()),
        transaction_date: Set(new.date),
        description: Set(new.description),
        merchant_name: Set(new.merchant_name),
        is_pending: Set(new.posting.is_pending),
        source: Set(new.source),
        external_id: Set(new.external_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// The balance-relevant view of a stored row.
pub(crate) fn posting_of(row: &transactions::Model) -> Posting {
    let direction: FlowDirection = row.direction;
    Posting::new(row.amount, direction.into(), row.is_pending)
}

/// Loads an owned transaction without locking it.
pub(crate) async fn find_owned_transaction<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    transaction_id: Uuid,
) -> StoreResult<transactions::Model> {
    transactions::Entity::find_by_id(transaction_id)
        .filter(transactions::Column::UserId.eq(owner.into_inner()))
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Transaction not found"))
}

async fn lock_owned_transaction<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    transaction_id: Uuid,
) -> StoreResult<transactions::Model> {
    transactions::Entity::find_by_id(transaction_id)
        .filter(transactions::Column::UserId.eq(owner.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Transaction not found"))
}

/// Which other records reference a transaction.
pub(crate) async fn linked_records<C: ConnectionTrait>(
    conn: &C,
    transaction_id: Uuid,
) -> Result<LinkedRecords, DbErr> {
    let transfer_count = transfers::Entity::find()
        .filter(
            Condition::any()
                .add(transfers::Column::FromTransactionId.eq(transaction_id))
                .add(transfers::Column::ToTransactionId.eq(transaction_id)),
        )
        .count(conn)
        .await?;
    let payment_count = debt_payments::Entity::find()
        .filter(debt_payments::Column::TransactionId.eq(transaction_id))
        .count(conn)
        .await?;
    let contribution_count = goal_contributions::Entity::find()
        .filter(goal_contributions::Column::TransactionId.eq(transaction_id))
        .count(conn)
        .await?;

    Ok(LinkedRecords {
        is_transfer_leg: transfer_count > 0,
        has_debt_payment: payment_count > 0,
        has_goal_contributions: contribution_count > 0,
    })
}

fn prepare_posting(
    account: &accounts::Model,
    input: &CreateTransactionInput,
) -> StoreResult<Posting> {
    let account_currency = parse_currency(&account.currency)?;
    let currency = parse_currency(&input.currency)?;
    Ok(LedgerService::prepare_create(
        input.transaction_type,
        input.amount,
        input.direction,
        &account_currency,
        &currency,
        input.is_pending,
    )?)
}
