//! Per-category totals over a date range.

use finnit_shared::types::CategoryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::TransactionType;

/// One categorized transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedLine {
    /// Category.
    pub category_id: CategoryId,
    /// Category display name.
    pub name: String,
    /// Transaction type.
    pub kind: TransactionType,
    /// Positive magnitude.
    pub amount: Decimal,
}

/// Totals for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpend {
    /// Category.
    pub category_id: CategoryId,
    /// Category display name.
    pub name: String,
    /// Expenses count positive, everything else negative.
    pub total_amount: Decimal,
    /// Transactions counted.
    pub transaction_count: u64,
    /// Total divided by count, two places.
    pub average_amount: Decimal,
}

/// Folds categorized lines into per-category totals, largest magnitude first.
///
/// Transfer legs are skipped.
#[must_use]
pub fn summarize_usage<I>(lines: I) -> Vec<CategorySpend>
where
    I: IntoIterator<Item = CategorizedLine>,
{
    let mut totals: Vec<CategorySpend> = Vec::new();

    for line in lines {
        if line.kind == TransactionType::Transfer {
            continue;
        }
        let signed = if line.kind == TransactionType::Expense {
            line.amount
        } else {
            -line.amount
        };

        match totals.iter_mut().find(|entry| entry.category_id == line.category_id) {
            Some(entry) => {
                entry.total_amount += signed;
                entry.transaction_count += 1;
            }
            None => totals.push(CategorySpend {
                category_id: line.category_id,
                name: line.name,
                total_amount: signed,
                transaction_count: 1,
                average_amount: Decimal::ZERO,
            }),
        }
    }

    for entry in &mut totals {
        entry.average_amount =
            (entry.total_amount / Decimal::from(entry.transaction_count)).round_dp(2);
    }
    totals.sort_by(|a, b| b.total_amount.abs().cmp(&a.total_amount.abs()));
    totals
}
