//! Shared fixtures for the store integration tests.
//!
//! Every test gets its own in-memory `SQLite` database with the ledger schema
//! applied, so tests never share state and need no running server.

#![allow(dead_code)]

use chrono::NaiveDate;
use finnit_core::ledger::TransactionType;
use finnit_db::entities::{accounts, sea_orm_active_enums::AccountType, transactions};
use finnit_db::repositories::{CreateAccountInput, CreateTransactionInput};
use finnit_db::{AccountRepository, TransactionRepository};
use finnit_shared::types::{AccountId, CategoryId, UserId};
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

/// Opens a fresh in-memory database and runs the migration.
pub async fn setup_db() -> DatabaseConnection {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("finnit_db=debug")
        .with_test_writer()
        .try_init();

    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    finnit_db::migrate(&db)
        .await
        .expect("Failed to apply migration");
    db
}

/// A fixed date so period math is deterministic.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).expect("valid date")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Creates a USD debit account with an opening balance.
pub async fn create_account(
    db: &DatabaseConnection,
    owner: UserId,
    name: &str,
    initial_balance: Decimal,
) -> accounts::Model {
    AccountRepository::new(db.clone())
        .create_account(
            owner,
            CreateAccountInput {
                name: name.to_string(),
                account_type: AccountType::Debit,
                currency: "USD".to_string(),
                initial_balance,
                metadata: None,
            },
        )
        .await
        .expect("Failed to create account")
}

/// Input for a confirmed USD transaction dated [`today`].
pub fn transaction_input(
    account: &accounts::Model,
    transaction_type: TransactionType,
    amount: Decimal,
) -> CreateTransactionInput {
    CreateTransactionInput {
        account_id: AccountId::from_uuid(account.id),
        category_id: None,
        transaction_type,
        amount,
        currency: "USD".to_string(),
        date: today(),
        description: None,
        merchant_name: None,
        is_pending: false,
        direction: None,
    }
}

/// Books a confirmed expense, optionally categorized.
pub async fn spend(
    db: &DatabaseConnection,
    owner: UserId,
    account: &accounts::Model,
    amount: Decimal,
    category_id: Option<CategoryId>,
) -> transactions::Model {
    let input = CreateTransactionInput {
        category_id,
        ..transaction_input(account, TransactionType::Expense, amount)
    };
    TransactionRepository::new(db.clone())
        .create_transaction(owner, input)
        .await
        .expect("Failed to create expense")
}

/// Current stored balance of an account.
pub async fn balance_of(db: &DatabaseConnection, owner: UserId, account_id: uuid::Uuid) -> Decimal {
    AccountRepository::new(db.clone())
        .find_account(owner, AccountId::from_uuid(account_id))
        .await
        .expect("Failed to load account")
        .balance_current
}
