//! Ledger schema.
//!
//! Creates the account, transaction, transfer, category, debt, goal and
//! budget tables with their foreign keys and lookup indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // ACCOUNTS & CATEGORIES
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(uuid_pk(Accounts::Id))
                    .col(ColumnDef::new(Accounts::UserId).uuid().not_null())
                    .col(ColumnDef::new(Accounts::Name).string_len(100).not_null())
                    .col(enum_text(Accounts::AccountType))
                    .col(currency(Accounts::Currency))
                    .col(money(Accounts::BalanceCurrent))
                    .col(
                        ColumnDef::new(Accounts::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Accounts::Metadata).json_binary().not_null())
                    .col(timestamp(Accounts::CreatedAt))
                    .col(timestamp(Accounts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(uuid_pk(Categories::Id))
                    .col(ColumnDef::new(Categories::UserId).uuid().null())
                    .col(ColumnDef::new(Categories::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Categories::ParentId).uuid().null())
                    .col(
                        ColumnDef::new(Categories::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Categories::Icon).string_len(50).null())
                    .col(ColumnDef::new(Categories::Color).string_len(20).null())
                    .col(timestamp(Categories::CreatedAt))
                    .col(timestamp(Categories::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_parent")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // TRANSACTIONS & TRANSFERS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(uuid_pk(Transactions::Id))
                    .col(ColumnDef::new(Transactions::UserId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::AccountId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::CategoryId).uuid().null())
                    .col(enum_text(Transactions::TransactionType))
                    .col(enum_text(Transactions::Direction))
                    .col(money(Transactions::Amount))
                    .col(currency(Transactions::Currency))
                    .col(ColumnDef::new(Transactions::TransactionDate).date().not_null())
                    .col(ColumnDef::new(Transactions::Description).text().null())
                    .col(ColumnDef::new(Transactions::MerchantName).string_len(200).null())
                    .col(
                        ColumnDef::new(Transactions::IsPending)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(enum_text(Transactions::Source))
                    .col(ColumnDef::new(Transactions::ExternalId).string_len(100).null())
                    .col(timestamp(Transactions::CreatedAt))
                    .col(timestamp(Transactions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_account")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_category")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_user_date")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::TransactionDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_account")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(uuid_pk(Transfers::Id))
                    .col(
                        ColumnDef::new(Transfers::FromTransactionId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Transfers::ToTransactionId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(money(Transfers::Amount))
                    .col(timestamp(Transfers::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfers_from_transaction")
                            .from(Transfers::Table, Transfers::FromTransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfers_to_transaction")
                            .from(Transfers::Table, Transfers::ToTransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // DEBTS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Debts::Table)
                    .if_not_exists()
                    .col(uuid_pk(Debts::Id))
                    .col(ColumnDef::new(Debts::UserId).uuid().not_null())
                    .col(ColumnDef::new(Debts::Name).string_len(100).not_null())
                    .col(enum_text(Debts::Kind))
                    .col(money(Debts::Principal))
                    .col(
                        ColumnDef::new(Debts::InterestRateAnnual)
                            .decimal_len(9, 4)
                            .null(),
                    )
                    .col(optional_money(Debts::MinPaymentAmount))
                    .col(ColumnDef::new(Debts::StartDate).date().null())
                    .col(ColumnDef::new(Debts::DueDate).date().null())
                    .col(ColumnDef::new(Debts::AccountId).uuid().null())
                    .col(timestamp(Debts::CreatedAt))
                    .col(timestamp(Debts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_debts_account")
                            .from(Debts::Table, Debts::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DebtPayments::Table)
                    .if_not_exists()
                    .col(uuid_pk(DebtPayments::Id))
                    .col(ColumnDef::new(DebtPayments::DebtId).uuid().not_null())
                    .col(ColumnDef::new(DebtPayments::TransactionId).uuid().not_null())
                    .col(money(DebtPayments::Amount))
                    .col(ColumnDef::new(DebtPayments::PaymentDate).date().not_null())
                    .col(timestamp(DebtPayments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_debt_payments_debt")
                            .from(DebtPayments::Table, DebtPayments::DebtId)
                            .to(Debts::Table, Debts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_debt_payments_transaction")
                            .from(DebtPayments::Table, DebtPayments::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_debt_payments_debt")
                    .table(DebtPayments::Table)
                    .col(DebtPayments::DebtId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // GOALS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(uuid_pk(Goals::Id))
                    .col(ColumnDef::new(Goals::UserId).uuid().not_null())
                    .col(ColumnDef::new(Goals::Name).string_len(100).not_null())
                    .col(money(Goals::TargetAmount))
                    .col(money(Goals::CurrentAmount))
                    .col(currency(Goals::Currency))
                    .col(ColumnDef::new(Goals::DueDate).date().null())
                    .col(timestamp(Goals::CreatedAt))
                    .col(timestamp(Goals::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GoalContributions::Table)
                    .if_not_exists()
                    .col(uuid_pk(GoalContributions::Id))
                    .col(ColumnDef::new(GoalContributions::GoalId).uuid().not_null())
                    .col(ColumnDef::new(GoalContributions::TransactionId).uuid().null())
                    .col(money(GoalContributions::Amount))
                    .col(money(GoalContributions::AppliedAmount))
                    .col(
                        ColumnDef::new(GoalContributions::ContributionDate)
                            .date()
                            .not_null(),
                    )
                    .col(timestamp(GoalContributions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_goal_contributions_goal")
                            .from(GoalContributions::Table, GoalContributions::GoalId)
                            .to(Goals::Table, Goals::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_goal_contributions_transaction")
                            .from(GoalContributions::Table, GoalContributions::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_goal_contributions_goal")
                    .table(GoalContributions::Table)
                    .col(GoalContributions::GoalId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // BUDGETS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(uuid_pk(Budgets::Id))
                    .col(ColumnDef::new(Budgets::UserId).uuid().not_null())
                    .col(ColumnDef::new(Budgets::Year).integer().not_null())
                    .col(ColumnDef::new(Budgets::Month).integer().not_null())
                    .col(currency(Budgets::Currency))
                    .col(optional_money(Budgets::AmountTotal))
                    .col(timestamp(Budgets::CreatedAt))
                    .col(timestamp(Budgets::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // One budget per owner and month
        manager
            .create_index(
                Index::create()
                    .name("uq_budgets_user_period")
                    .table(Budgets::Table)
                    .col(Budgets::UserId)
                    .col(Budgets::Year)
                    .col(Budgets::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetCategories::Table)
                    .if_not_exists()
                    .col(uuid_pk(BudgetCategories::Id))
                    .col(ColumnDef::new(BudgetCategories::BudgetId).uuid().not_null())
                    .col(ColumnDef::new(BudgetCategories::CategoryId).uuid().not_null())
                    .col(money(BudgetCategories::CapAmount))
                    .col(timestamp(BudgetCategories::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_categories_budget")
                            .from(BudgetCategories::Table, BudgetCategories::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_categories_category")
                            .from(BudgetCategories::Table, BudgetCategories::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_budget_categories_budget_category")
                    .table(BudgetCategories::Table)
                    .col(BudgetCategories::BudgetId)
                    .col(BudgetCategories::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BudgetCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GoalContributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DebtPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Debts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

fn uuid_pk<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column).uuid().not_null().primary_key().to_owned()
}

/// Widest precision every supported backend accepts; SQLite caps it at 16.
const MONEY_PRECISION: u32 = 16;
const MONEY_SCALE: u32 = 4;

fn money<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .decimal_len(MONEY_PRECISION, MONEY_SCALE)
        .not_null()
        .to_owned()
}

fn optional_money<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .decimal_len(MONEY_PRECISION, MONEY_SCALE)
        .null()
        .to_owned()
}

fn currency<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column).string_len(3).not_null().to_owned()
}

fn enum_text<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column).string_len(16).not_null().to_owned()
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    UserId,
    Name,
    AccountType,
    Currency,
    BalanceCurrent,
    IsArchived,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    ParentId,
    IsDefault,
    Icon,
    Color,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    UserId,
    AccountId,
    CategoryId,
    TransactionType,
    Direction,
    Amount,
    Currency,
    TransactionDate,
    Description,
    MerchantName,
    IsPending,
    Source,
    ExternalId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Transfers {
    Table,
    Id,
    FromTransactionId,
    ToTransactionId,
    Amount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Debts {
    Table,
    Id,
    UserId,
    Name,
    Kind,
    Principal,
    InterestRateAnnual,
    MinPaymentAmount,
    StartDate,
    DueDate,
    AccountId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DebtPayments {
    Table,
    Id,
    DebtId,
    TransactionId,
    Amount,
    PaymentDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Goals {
    Table,
    Id,
    UserId,
    Name,
    TargetAmount,
    CurrentAmount,
    Currency,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GoalContributions {
    Table,
    Id,
    GoalId,
    TransactionId,
    Amount,
    AppliedAmount,
    ContributionDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Budgets {
    Table,
    Id,
    UserId,
    Year,
    Month,
    Currency,
    AmountTotal,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BudgetCategories {
    Table,
    Id,
    BudgetId,
    CategoryId,
    CapAmount,
    CreatedAt,
}
