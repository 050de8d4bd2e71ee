//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every query is scoped by the owning user; rows owned by someone else are
//! reported as not found.

pub mod account;
pub mod budget;
pub mod category;
pub mod debt;
pub mod goal;
pub mod report;
pub mod suggestion;
pub mod transaction;
pub mod transfer;

pub use account::{
    AccountFilter, AccountRepository, AdjustBalanceInput, CreateAccountInput, Reconciliation,
    UpdateAccountInput,
};
pub use budget::{
    BudgetCapInput, BudgetRepository, BudgetWithCategories, CreateBudgetInput, UpdateBudgetInput,
};
pub use category::{CategoryRepository, CreateCategoryInput, UpdateCategoryInput};
pub use debt::{
    CreateDebtInput, DebtRepository, DebtWithBalance, RecordPaymentInput, UpdateDebtInput,
};
pub use goal::{AddContributionInput, CreateGoalInput, GoalRepository, UpdateGoalInput};
pub use report::ReportRepository;
pub use suggestion::{CategorySuggester, HistoryCategorySuggester};
pub use transaction::{
    BulkImportResult, CreateTransactionInput, ImportTransactionInput, TransactionFilter,
    TransactionRepository, UpdateTransactionInput,
};
pub use transfer::{CreateTransferInput, TransferFilter, TransferRepository, TransferWithLegs};

use finnit_shared::{AppError, AppResult};
use sea_orm::sea_query::LikeExpr;

/// Escape character for [`contains_pattern`].
const LIKE_ESCAPE: char = '\\';

/// Trims a display name and rejects blanks.
fn required_name(name: &str, what: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{what} name cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// `LIKE` pattern matching `text` anywhere, with `%` and `_` taken literally.
fn contains_pattern(text: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(text))).escape(LIKE_ESCAPE)
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
