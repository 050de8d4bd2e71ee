//! Integration tests for accounts and transactions.
//!
//! Every write must keep `balance_current` equal to the replay of the
//! account's confirmed transactions. Most tests end with a reconciliation.

mod common;

use std::sync::Arc;

use common::{balance_of, create_account, date, setup_db, spend, today, transaction_input};
use finnit_core::ledger::{FlowDirection, TransactionType};
use finnit_db::entities::sea_orm_active_enums::{
    AccountType, TransactionSource, TransactionType as StoredType,
};
use finnit_db::repositories::{
    AccountFilter, AdjustBalanceInput, CategorySuggester, CreateAccountInput, CreateCategoryInput,
    CreateTransactionInput, ImportTransactionInput, TransactionFilter, UpdateAccountInput,
    UpdateTransactionInput,
};
use finnit_db::{AccountRepository, CategoryRepository, TransactionRepository};
use finnit_shared::AppError;
use finnit_shared::types::{AccountId, CategoryId, PageRequest, TransactionId, UserId};
use rstest::rstest;
use rust_decimal_macros::dec;

fn account_id(account: &finnit_db::entities::accounts::Model) -> AccountId {
    AccountId::from_uuid(account.id)
}

async fn assert_consistent(db: &sea_orm::DatabaseConnection, owner: UserId, account_id: AccountId) {
    let report = AccountRepository::new(db.clone())
        .reconcile(owner, account_id)
        .await
        .expect("reconcile");
    assert!(
        report.is_consistent(),
        "stored {} != replayed {}",
        report.stored,
        report.replayed
    );
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_create_account_books_opening_balance() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(1000)).await;

    assert_eq!(account.balance_current, dec!(1000));

    let page = TransactionRepository::new(db.clone())
        .list_transactions(
            owner,
            TransactionFilter {
                account_id: Some(account_id(&account)),
                ..TransactionFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].description.as_deref(), Some("Initial balance"));
    assert_eq!(page.data[0].transaction_type, StoredType::Income);

    assert_consistent(&db, owner, account_id(&account)).await;
}

#[tokio::test]
async fn test_zero_opening_balance_books_nothing() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Wallet", dec!(0)).await;

    let page = TransactionRepository::new(db.clone())
        .list_transactions(owner, TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 0);

    // Unused accounts can be deleted outright.
    AccountRepository::new(db.clone())
        .delete_account(owner, account_id(&account))
        .await
        .unwrap();
}

#[rstest]
#[case::blank_name("   ", "USD", dec!(0))]
#[case::bad_currency("Checking", "usd1", dec!(0))]
#[case::sub_cent_balance("Checking", "USD", dec!(10.005))]
#[tokio::test]
async fn test_create_account_rejects_bad_input(
    #[case] name: &str,
    #[case] currency: &str,
    #[case] initial_balance: rust_decimal::Decimal,
) {
    let db = setup_db().await;
    let result = AccountRepository::new(db.clone())
        .create_account(
            UserId::new(),
            CreateAccountInput {
                name: name.to_string(),
                account_type: AccountType::Cash,
                currency: currency.to_string(),
                initial_balance,
                metadata: None,
            },
        )
        .await;

    assert!(matches!(
        result.unwrap_err().as_domain(),
        Some(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_account_with_history_cannot_be_deleted() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(50)).await;

    let err = AccountRepository::new(db.clone())
        .delete_account(owner, account_id(&account))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));
}

#[tokio::test]
async fn test_archived_account_rejects_postings_and_hides_from_listing() {
    let db = setup_db().await;
    let owner = UserId::new();
    let accounts = AccountRepository::new(db.clone());
    let account = create_account(&db, owner, "Old card", dec!(20)).await;

    let archived = accounts.archive_account(owner, account_id(&account)).await.unwrap();
    assert!(archived.is_archived);

    let err = TransactionRepository::new(db.clone())
        .create_transaction(owner, transaction_input(&account, TransactionType::Expense, dec!(5)))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    let visible = accounts.list_accounts(owner, AccountFilter::default()).await.unwrap();
    assert!(visible.is_empty());
    let all = accounts
        .list_accounts(
            owner,
            AccountFilter {
                include_archived: true,
                ..AccountFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_archived_account_rejects_amendments() {
    let db = setup_db().await;
    let owner = UserId::new();
    let accounts = AccountRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());
    let account = create_account(&db, owner, "Old card", dec!(100)).await;
    let expense = spend(&db, owner, &account, dec!(30), None).await;
    accounts.archive_account(owner, account_id(&account)).await.unwrap();

    let err = transactions
        .update_transaction(
            owner,
            TransactionId::from_uuid(expense.id),
            UpdateTransactionInput {
                amount: Some(dec!(45)),
                ..UpdateTransactionInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    let err = transactions
        .set_pending(owner, TransactionId::from_uuid(expense.id), true)
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    assert_eq!(balance_of(&db, owner, account.id).await, dec!(70));
}

#[tokio::test]
async fn test_update_account_never_touches_balance() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(75)).await;

    let updated = AccountRepository::new(db.clone())
        .update_account(
            owner,
            account_id(&account),
            UpdateAccountInput {
                name: Some("  Main checking ".to_string()),
                account_type: Some(AccountType::Savings),
                metadata: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Main checking");
    assert_eq!(updated.account_type, AccountType::Savings);
    assert_eq!(updated.balance_current, dec!(75));
}

#[tokio::test]
async fn test_adjust_balance_books_signed_correction() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Cash", dec!(100)).await;
    let accounts = AccountRepository::new(db.clone());

    let adjusted = accounts
        .adjust_balance(
            owner,
            account_id(&account),
            AdjustBalanceInput {
                amount: dec!(-12.5),
                description: Some("Counted the drawer".to_string()),
                date: today(),
            },
        )
        .await
        .unwrap();
    assert_eq!(adjusted.balance_current, dec!(87.5));

    let err = accounts
        .adjust_balance(
            owner,
            account_id(&account),
            AdjustBalanceInput {
                amount: dec!(0),
                description: None,
                date: today(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    assert_consistent(&db, owner, account_id(&account)).await;
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn test_expense_and_income_move_balance() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(1000)).await;
    let repo = TransactionRepository::new(db.clone());

    spend(&db, owner, &account, dec!(300), None).await;
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(700));

    repo.create_transaction(owner, transaction_input(&account, TransactionType::Income, dec!(50)))
        .await
        .unwrap();
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(750));

    assert_consistent(&db, owner, account_id(&account)).await;
}

#[tokio::test]
async fn test_pending_transaction_waits_for_confirmation() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(200)).await;
    let repo = TransactionRepository::new(db.clone());

    let pending = repo
        .create_transaction(
            owner,
            CreateTransactionInput {
                is_pending: true,
                ..transaction_input(&account, TransactionType::Expense, dec!(40))
            },
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(200));

    let id = TransactionId::from_uuid(pending.id);
    repo.set_pending(owner, id, false).await.unwrap();
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(160));

    // Repeating the same state is a no-op.
    repo.set_pending(owner, id, false).await.unwrap();
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(160));

    repo.set_pending(owner, id, true).await.unwrap();
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(200));

    assert_consistent(&db, owner, account_id(&account)).await;
}

#[tokio::test]
async fn test_direction_contradicting_type_is_rejected() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(10)).await;

    let err = TransactionRepository::new(db.clone())
        .create_transaction(
            owner,
            CreateTransactionInput {
                direction: Some(FlowDirection::Inflow),
                ..transaction_input(&account, TransactionType::Expense, dec!(5))
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(10));
}

#[tokio::test]
async fn test_update_applies_only_the_difference() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(500)).await;
    let repo = TransactionRepository::new(db.clone());

    let expense = spend(&db, owner, &account, dec!(100), None).await;
    let id = TransactionId::from_uuid(expense.id);

    repo.update_transaction(
        owner,
        id,
        UpdateTransactionInput {
            amount: Some(dec!(150)),
            ..UpdateTransactionInput::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(350));

    let flipped = repo
        .update_transaction(
            owner,
            id,
            UpdateTransactionInput {
                transaction_type: Some(TransactionType::Income),
                ..UpdateTransactionInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(flipped.transaction_type, StoredType::Income);
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(650));

    assert_consistent(&db, owner, account_id(&account)).await;
}

#[tokio::test]
async fn test_delete_reverses_balance_effect() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(500)).await;
    let repo = TransactionRepository::new(db.clone());

    let expense = spend(&db, owner, &account, dec!(120), None).await;
    repo.delete_transaction(owner, TransactionId::from_uuid(expense.id))
        .await
        .unwrap();

    assert_eq!(balance_of(&db, owner, account.id).await, dec!(500));
    let err = repo
        .find_transaction(owner, TransactionId::from_uuid(expense.id))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_mixed_history_reconciles_without_drift() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(1000)).await;
    let repo = TransactionRepository::new(db.clone());
    let accounts = AccountRepository::new(db.clone());

    let a = spend(&db, owner, &account, dec!(80), None).await;
    let b = repo
        .create_transaction(
            owner,
            CreateTransactionInput {
                is_pending: true,
                ..transaction_input(&account, TransactionType::Income, dec!(400))
            },
        )
        .await
        .unwrap();
    let c = spend(&db, owner, &account, dec!(25.5), None).await;

    repo.update_transaction(
        owner,
        TransactionId::from_uuid(a.id),
        UpdateTransactionInput {
            amount: Some(dec!(90)),
            ..UpdateTransactionInput::default()
        },
    )
    .await
    .unwrap();
    repo.set_pending(owner, TransactionId::from_uuid(b.id), false)
        .await
        .unwrap();
    repo.delete_transaction(owner, TransactionId::from_uuid(c.id))
        .await
        .unwrap();
    accounts
        .adjust_balance(
            owner,
            account_id(&account),
            AdjustBalanceInput {
                amount: dec!(10),
                description: None,
                date: today(),
            },
        )
        .await
        .unwrap();

    // 1000 - 90 + 400 + 10
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(1320));
    assert_consistent(&db, owner, account_id(&account)).await;
}

#[tokio::test]
async fn test_other_owners_rows_are_not_found() {
    let db = setup_db().await;
    let owner = UserId::new();
    let stranger = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(100)).await;
    let expense = spend(&db, owner, &account, dec!(10), None).await;
    let repo = TransactionRepository::new(db.clone());

    let err = AccountRepository::new(db.clone())
        .find_account(stranger, account_id(&account))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::NotFound(_))));

    let err = repo
        .create_transaction(stranger, transaction_input(&account, TransactionType::Expense, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::NotFound(_))));

    let err = repo
        .delete_transaction(stranger, TransactionId::from_uuid(expense.id))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::NotFound(_))));

    assert_eq!(balance_of(&db, owner, account.id).await, dec!(90));
}

#[tokio::test]
async fn test_list_transactions_filters_searches_and_pages() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(1000)).await;
    let repo = TransactionRepository::new(db.clone());

    for (merchant, amount) in [("Corner Bakery", dec!(4)), ("Fuel Stop", dec!(40)), ("Bakery Deluxe", dec!(9))] {
        repo.create_transaction(
            owner,
            CreateTransactionInput {
                merchant_name: Some(merchant.to_string()),
                ..transaction_input(&account, TransactionType::Expense, amount)
            },
        )
        .await
        .unwrap();
    }

    let bakeries = repo
        .list_transactions(
            owner,
            TransactionFilter {
                search: Some("bakery".to_string()),
                ..TransactionFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(bakeries.meta.total, 2);

    let expenses = repo
        .list_transactions(
            owner,
            TransactionFilter {
                transaction_type: Some(TransactionType::Expense),
                ..TransactionFilter::default()
            },
            PageRequest::new(1, 2),
        )
        .await
        .unwrap();
    assert_eq!(expenses.meta.total, 3);
    assert_eq!(expenses.data.len(), 2);
    assert!(expenses.has_next());
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(1000)).await;
    let repo = TransactionRepository::new(db.clone());

    for merchant in ["100% Organic", "1000 Island Deli", "Fuel_Stop", "FuelXStop"] {
        repo.create_transaction(
            owner,
            CreateTransactionInput {
                merchant_name: Some(merchant.to_string()),
                ..transaction_input(&account, TransactionType::Expense, dec!(5))
            },
        )
        .await
        .unwrap();
    }

    for (search, expected) in [("100%", "100% Organic"), ("fuel_", "Fuel_Stop")] {
        let found = repo
            .list_transactions(
                owner,
                TransactionFilter {
                    search: Some(search.to_string()),
                    ..TransactionFilter::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(found.meta.total, 1, "search {search}");
        assert_eq!(found.data[0].merchant_name.as_deref(), Some(expected));
    }
}

#[tokio::test]
async fn test_summary_totals_income_and_expenses() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(0)).await;
    let repo = TransactionRepository::new(db.clone());

    repo.create_transaction(owner, transaction_input(&account, TransactionType::Income, dec!(2000)))
        .await
        .unwrap();
    spend(&db, owner, &account, dec!(450), None).await;
    spend(&db, owner, &account, dec!(50), None).await;

    let summary = repo
        .summary(owner, date(2026, 3, 1), date(2026, 3, 31))
        .await
        .unwrap();
    assert_eq!(summary.total_income, dec!(2000));
    assert_eq!(summary.total_expenses, dec!(500));
    assert_eq!(summary.net_amount, dec!(1500));
    assert_eq!(summary.transaction_count, 3);
}

// ============================================================================
// Imports
// ============================================================================

fn imported(
    account: &finnit_db::entities::accounts::Model,
    amount: rust_decimal::Decimal,
    external_id: &str,
) -> ImportTransactionInput {
    ImportTransactionInput {
        input: transaction_input(account, TransactionType::Expense, amount),
        external_id: Some(external_id.to_string()),
    }
}

#[tokio::test]
async fn test_bulk_import_skips_known_external_ids() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(1000)).await;
    let repo = TransactionRepository::new(db.clone());

    let first = repo
        .bulk_import(
            owner,
            vec![imported(&account, dec!(10), "bank-1"), imported(&account, dec!(20), "bank-2")],
        )
        .await
        .unwrap();
    assert_eq!(first.imported.len(), 2);
    assert_eq!(first.skipped, 0);
    assert!(first.imported.iter().all(|row| row.source == TransactionSource::Imported));

    let second = repo
        .bulk_import(
            owner,
            vec![
                imported(&account, dec!(20), "bank-2"),
                imported(&account, dec!(30), "bank-3"),
                imported(&account, dec!(30), "bank-3"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(second.imported.len(), 1);
    assert_eq!(second.skipped, 2);

    assert_eq!(balance_of(&db, owner, account.id).await, dec!(940));
    assert_consistent(&db, owner, account_id(&account)).await;
}

#[tokio::test]
async fn test_bulk_import_is_all_or_nothing() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(100)).await;
    let repo = TransactionRepository::new(db.clone());

    let err = repo
        .bulk_import(
            owner,
            vec![imported(&account, dec!(10), "ok"), imported(&account, dec!(-3), "bad")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    let page = repo
        .list_transactions(owner, TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(balance_of(&db, owner, account.id).await, dec!(100));
}

#[tokio::test]
async fn test_imported_rows_only_accept_category_and_description() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(100)).await;
    let repo = TransactionRepository::new(db.clone());
    let groceries = CategoryRepository::new(db.clone())
        .create_category(
            owner,
            CreateCategoryInput {
                name: "Groceries".to_string(),
                parent_id: None,
                icon: None,
                color: None,
            },
        )
        .await
        .unwrap();

    let result = repo
        .bulk_import(owner, vec![imported(&account, dec!(30), "bank-9")])
        .await
        .unwrap();
    let id = TransactionId::from_uuid(result.imported[0].id);

    let err = repo
        .update_transaction(
            owner,
            id,
            UpdateTransactionInput {
                amount: Some(dec!(31)),
                ..UpdateTransactionInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    let err = repo.set_pending(owner, id, true).await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    let err = repo.delete_transaction(owner, id).await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    let recategorized = repo
        .recategorize(owner, id, Some(CategoryId::from_uuid(groceries.id)))
        .await
        .unwrap();
    assert_eq!(recategorized.category_id, Some(groceries.id));

    assert_eq!(balance_of(&db, owner, account.id).await, dec!(70));
}

// ============================================================================
// Category suggestion
// ============================================================================

#[tokio::test]
async fn test_uncategorized_merchant_gets_history_suggestion() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(100)).await;
    let repo = TransactionRepository::new(db.clone());
    let coffee = CategoryRepository::new(db.clone())
        .create_category(
            owner,
            CreateCategoryInput {
                name: "Coffee".to_string(),
                parent_id: None,
                icon: None,
                color: None,
            },
        )
        .await
        .unwrap();

    repo.create_transaction(
        owner,
        CreateTransactionInput {
            category_id: Some(CategoryId::from_uuid(coffee.id)),
            merchant_name: Some("Starbucks Downtown".to_string()),
            ..transaction_input(&account, TransactionType::Expense, dec!(5))
        },
    )
    .await
    .unwrap();

    let suggested = repo
        .create_transaction(
            owner,
            CreateTransactionInput {
                merchant_name: Some("STARBUCKS Airport".to_string()),
                ..transaction_input(&account, TransactionType::Expense, dec!(6))
            },
        )
        .await
        .unwrap();
    assert_eq!(suggested.category_id, Some(coffee.id));

    // Another owner's history never leaks into suggestions.
    let stranger = UserId::new();
    let other = create_account(&db, stranger, "Checking", dec!(100)).await;
    let unsuggested = repo
        .create_transaction(
            stranger,
            CreateTransactionInput {
                merchant_name: Some("Starbucks Station".to_string()),
                ..transaction_input(&other, TransactionType::Expense, dec!(4))
            },
        )
        .await
        .unwrap();
    assert_eq!(unsuggested.category_id, None);
}

#[tokio::test]
async fn test_suggestion_does_not_expand_wildcards_in_merchant() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(100)).await;
    let repo = TransactionRepository::new(db.clone());
    let gym = CategoryRepository::new(db.clone())
        .create_category(
            owner,
            CreateCategoryInput {
                name: "Gym".to_string(),
                parent_id: None,
                icon: None,
                color: None,
            },
        )
        .await
        .unwrap();

    repo.create_transaction(
        owner,
        CreateTransactionInput {
            category_id: Some(CategoryId::from_uuid(gym.id)),
            merchant_name: Some("5000 Fitness Club".to_string()),
            ..transaction_input(&account, TransactionType::Expense, dec!(30))
        },
    )
    .await
    .unwrap();

    let sale = repo
        .create_transaction(
            owner,
            CreateTransactionInput {
                merchant_name: Some("50% Sale Outlet".to_string()),
                ..transaction_input(&account, TransactionType::Expense, dec!(12))
            },
        )
        .await
        .unwrap();
    assert_eq!(sale.category_id, None);
}

/// Files every merchant under one category.
struct FixedSuggester(CategoryId);

#[async_trait::async_trait]
impl CategorySuggester for FixedSuggester {
    async fn suggest(&self, _owner: UserId, _merchant_name: &str) -> Option<CategoryId> {
        Some(self.0)
    }
}

#[tokio::test]
async fn test_injected_suggester_fills_missing_category() {
    let db = setup_db().await;
    let owner = UserId::new();
    let account = create_account(&db, owner, "Checking", dec!(100)).await;
    let misc = CategoryRepository::new(db.clone())
        .create_category(
            owner,
            CreateCategoryInput {
                name: "Misc".to_string(),
                ..CreateCategoryInput::default()
            },
        )
        .await
        .unwrap();
    let repo = TransactionRepository::with_suggester(
        db.clone(),
        Arc::new(FixedSuggester(CategoryId::from_uuid(misc.id))),
    );

    let filed = repo
        .create_transaction(
            owner,
            CreateTransactionInput {
                merchant_name: Some("Corner Shop".to_string()),
                ..transaction_input(&account, TransactionType::Expense, dec!(3))
            },
        )
        .await
        .unwrap();
    assert_eq!(filed.category_id, Some(misc.id));

    // Without a merchant there is nothing to suggest from.
    let bare = repo
        .create_transaction(owner, transaction_input(&account, TransactionType::Expense, dec!(2)))
        .await
        .unwrap();
    assert_eq!(bare.category_id, None);
}
