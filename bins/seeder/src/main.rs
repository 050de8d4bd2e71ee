//! Demo data seeder for Finnit development.
//!
//! Applies the schema, then gives a fixed demo owner a category tree, two
//! accounts, a month of spending, a budget, a savings goal and a debt, then
//! logs the month's report. Running it again leaves an already seeded owner
//! untouched.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use finnit_core::debt::{DebtKind, PayoffStrategy};
use finnit_core::ledger::TransactionType;
use finnit_core::notify::{Notification, NotificationSink};
use finnit_core::reports::DEFAULT_PROJECTION_MONTHS;
use finnit_db::entities::{categories, sea_orm_active_enums::AccountType};
use finnit_db::repositories::{
    AccountFilter, AddContributionInput, BudgetCapInput, CreateAccountInput, CreateBudgetInput,
    CreateDebtInput, CreateGoalInput, CreateTransactionInput, CreateTransferInput,
    RecordPaymentInput,
};
use finnit_db::{
    AccountRepository, BudgetRepository, CategoryRepository, DebtRepository, GoalRepository,
    ReportRepository, TransactionRepository, TransferRepository,
};
use finnit_shared::AppConfig;
use finnit_shared::types::{AccountId, CategoryId, DebtId, GoalId, TransactionId, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Demo owner (consistent across runs).
const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

/// Logs notifications instead of delivering them.
struct LogSink;

impl NotificationSink for LogSink {
    fn dispatch(&self, notification: Notification) {
        match notification {
            Notification::BudgetAlert { alert, .. } => {
                info!(severity = ?alert.severity, "{}", alert.message);
            }
            Notification::GoalMilestone {
                goal_name,
                milestone,
                ..
            } => info!(goal = %goal_name, milestone, "goal milestone reached"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seeder=info,finnit=debug,sea_orm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = finnit_db::connect_with(&config.database).await?;
    finnit_db::migrate(&db).await?;
    info!("schema up to date");

    let owner = UserId::from_uuid(DEMO_USER_ID);
    let existing = AccountRepository::new(db.clone())
        .list_accounts(
            owner,
            AccountFilter {
                include_archived: true,
                ..AccountFilter::default()
            },
        )
        .await?;
    if !existing.is_empty() {
        info!(%owner, "demo owner already seeded, skipping");
        return Ok(());
    }

    let sink: Arc<dyn NotificationSink> = Arc::new(LogSink);
    let today = Utc::now().date_naive();

    let categories = CategoryRepository::new(db.clone())
        .seed_default_categories(owner)
        .await?;
    info!(count = categories.len(), "categories seeded");

    let (checking, savings) = seed_accounts(&db, owner).await?;
    seed_spending(&db, owner, checking, &categories, today).await?;
    seed_budget(&db, owner, &categories, today, sink.clone()).await?;
    seed_goal(&db, owner, checking, savings, today, sink, config.ledger).await?;
    seed_debt(&db, owner, checking, today).await?;
    report(&db, owner, today).await?;

    info!("seeding complete");
    Ok(())
}

fn category_id(categories: &[categories::Model], name: &str) -> anyhow::Result<CategoryId> {
    categories
        .iter()
        .find(|category| category.name == name)
        .map(|category| CategoryId::from_uuid(category.id))
        .with_context(|| format!("Seeded category {name} missing"))
}

async fn open_account(
    accounts: &AccountRepository,
    owner: UserId,
    name: &str,
    account_type: AccountType,
    initial_balance: Decimal,
) -> anyhow::Result<AccountId> {
    let account = accounts
        .create_account(
            owner,
            CreateAccountInput {
                name: name.to_string(),
                account_type,
                currency: "USD".to_string(),
                initial_balance,
                metadata: None,
            },
        )
        .await?;
    info!(account_id = %account.id, name, balance = %account.balance_current, "account opened");
    Ok(AccountId::from_uuid(account.id))
}

async fn seed_accounts(
    db: &DatabaseConnection,
    owner: UserId,
) -> anyhow::Result<(AccountId, AccountId)> {
    let accounts = AccountRepository::new(db.clone());
    let checking =
        open_account(&accounts, owner, "Everyday checking", AccountType::Debit, dec!(2500)).await?;
    let savings =
        open_account(&accounts, owner, "Rainy day savings", AccountType::Savings, dec!(0)).await?;
    Ok((checking, savings))
}

async fn seed_spending(
    db: &DatabaseConnection,
    owner: UserId,
    account: AccountId,
    categories: &[categories::Model],
    today: NaiveDate,
) -> anyhow::Result<()> {
    let transactions = TransactionRepository::new(db.clone());
    let first_of_month = today.with_day(1).unwrap_or(today);

    let lines: [(&str, &str, Decimal, TransactionType); 5] = [
        ("Salary", "Acme Corp", dec!(3200), TransactionType::Income),
        ("Groceries", "Green Market", dec!(84.20), TransactionType::Expense),
        ("Groceries", "Green Market", dec!(61.75), TransactionType::Expense),
        ("Restaurants", "Noodle Bar", dec!(42), TransactionType::Expense),
        ("Fuel", "Shell Station", dec!(55.10), TransactionType::Expense),
    ];

    for (category, merchant, amount, transaction_type) in lines {
        transactions
            .create_transaction(
                owner,
                CreateTransactionInput {
                    account_id: account,
                    category_id: Some(category_id(categories, category)?),
                    transaction_type,
                    amount,
                    currency: "USD".to_string(),
                    date: first_of_month,
                    description: None,
                    merchant_name: Some(merchant.to_string()),
                    is_pending: false,
                    direction: None,
                },
            )
            .await?;
    }

    // No category given: picked from the Green Market history.
    let suggested = transactions
        .create_transaction(
            owner,
            CreateTransactionInput {
                account_id: account,
                category_id: None,
                transaction_type: TransactionType::Expense,
                amount: dec!(23.40),
                currency: "USD".to_string(),
                date: today,
                description: Some("Weekend top-up".to_string()),
                merchant_name: Some("green market express".to_string()),
                is_pending: true,
                direction: None,
            },
        )
        .await?;
    info!(category = ?suggested.category_id, "pending purchase categorized from history");
    Ok(())
}

async fn seed_budget(
    db: &DatabaseConnection,
    owner: UserId,
    categories: &[categories::Model],
    today: NaiveDate,
    sink: Arc<dyn NotificationSink>,
) -> anyhow::Result<()> {
    let budgets = BudgetRepository::new(db.clone()).with_sink(sink);
    let budget = budgets
        .create_budget(
            owner,
            CreateBudgetInput {
                year: today.year(),
                month: today.month(),
                currency: "USD".to_string(),
                amount_total: Some(dec!(1500)),
                categories: vec![
                    BudgetCapInput {
                        category_id: category_id(categories, "Groceries")?,
                        cap_amount: dec!(180),
                    },
                    BudgetCapInput {
                        category_id: category_id(categories, "Restaurants")?,
                        cap_amount: dec!(120),
                    },
                ],
            },
        )
        .await?;
    info!(budget_id = %budget.budget.id, "budget created");

    let dispatched = budgets
        .dispatch_alerts(owner, today.year(), today.month())
        .await?;
    info!(dispatched, "budget alerts checked");
    Ok(())
}

async fn seed_goal(
    db: &DatabaseConnection,
    owner: UserId,
    checking: AccountId,
    savings: AccountId,
    today: NaiveDate,
    sink: Arc<dyn NotificationSink>,
    ledger: finnit_shared::LedgerConfig,
) -> anyhow::Result<()> {
    let transfer = TransferRepository::new(db.clone())
        .create_transfer(
            owner,
            CreateTransferInput {
                from_account_id: checking,
                to_account_id: savings,
                amount: dec!(600),
                description: Some("Monthly savings".to_string()),
                date: Some(today),
            },
        )
        .await?;

    let goals = GoalRepository::new(db.clone())
        .with_sink(sink)
        .with_config(ledger);
    let goal = goals
        .create_goal(
            owner,
            CreateGoalInput {
                name: "Emergency fund".to_string(),
                target_amount: dec!(2000),
                currency: "USD".to_string(),
                due_date: today.checked_add_months(chrono::Months::new(10)),
            },
        )
        .await?;
    let goal_id = GoalId::from_uuid(goal.id);

    goals
        .add_contribution(
            owner,
            goal_id,
            AddContributionInput {
                amount: dec!(600),
                transaction_id: Some(TransactionId::from_uuid(transfer.incoming.id)),
                date: Some(today),
            },
        )
        .await?;

    let progress = goals.goal_progress(owner, goal_id, today).await?;
    info!(
        percentage = %progress.percentage,
        monthly = ?progress.monthly_target_contribution,
        "goal progress"
    );
    Ok(())
}

async fn seed_debt(
    db: &DatabaseConnection,
    owner: UserId,
    checking: AccountId,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let debts = DebtRepository::new(db.clone());
    let debt = debts
        .create_debt(
            owner,
            CreateDebtInput {
                name: "Visa card".to_string(),
                kind: DebtKind::Card,
                principal: dec!(5000),
                interest_rate_annual: Some(dec!(18.5)),
                min_payment_amount: Some(dec!(150)),
                start_date: None,
                due_date: None,
                account_id: Some(checking),
            },
        )
        .await?;
    let debt_id = DebtId::from_uuid(debt.debt.id);

    let payment = TransactionRepository::new(db.clone())
        .create_transaction(
            owner,
            CreateTransactionInput {
                account_id: checking,
                category_id: None,
                transaction_type: TransactionType::Expense,
                amount: dec!(250),
                currency: "USD".to_string(),
                date: today,
                description: Some("Card payment".to_string()),
                merchant_name: None,
                is_pending: false,
                direction: None,
            },
        )
        .await?;
    debts
        .record_payment(
            owner,
            debt_id,
            RecordPaymentInput {
                transaction_id: TransactionId::from_uuid(payment.id),
                amount: dec!(250),
                payment_date: None,
            },
        )
        .await?;

    let schedule = debts.payoff_schedule(owner, debt_id, None, today).await?;
    info!(
        remaining = %schedule.current_balance,
        months = %schedule.months_remaining.round_dp(1),
        interest = ?schedule.total_interest,
        "debt payoff at minimum"
    );

    let plan = debts
        .payoff_strategy(owner, &[], dec!(100), PayoffStrategy::Avalanche, today)
        .await?;
    for projection in plan {
        info!(
            debt = %projection.debt_name,
            payoff_date = ?projection.schedule.payoff_date,
            "avalanche projection"
        );
    }
    Ok(())
}

async fn report(db: &DatabaseConnection, owner: UserId, today: NaiveDate) -> anyhow::Result<()> {
    let reports = ReportRepository::new(db.clone());
    let monthly = reports
        .monthly_report(owner, today.year(), today.month())
        .await?;
    info!(
        income = %monthly.total_income,
        expenses = %monthly.total_expenses,
        net = %monthly.net_income,
        categories = monthly.category_breakdown.len(),
        "monthly report"
    );

    let projection = reports
        .cash_flow_projection(owner, DEFAULT_PROJECTION_MONTHS, today)
        .await?;
    if let Some(last) = projection.last() {
        info!(date = %last.date, balance = %last.projected_balance, "cash-flow projection");
    }
    Ok(())
}
