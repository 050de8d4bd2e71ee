//! Category suggestion from the owner's merchant history.

use async_trait::async_trait;
use finnit_core::category::{SUGGESTION_WINDOW, merchant_key, most_common};
use finnit_shared::types::{CategoryId, UserId};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use super::contains_pattern;
use crate::entities::transactions;

/// Proposes a category for a transaction that arrives without one.
///
/// A suggester never fails the caller: when nothing fits it returns `None`.
#[async_trait]
pub trait CategorySuggester: Send + Sync {
    /// Suggests a category for `merchant_name` from `owner`'s perspective.
    async fn suggest(&self, owner: UserId, merchant_name: &str) -> Option<CategoryId>;
}

/// Picks the most common category among the owner's recent transactions
/// whose merchant contains the first word of `merchant_name`.
#[derive(Debug, Clone)]
pub struct HistoryCategorySuggester {
    db: DatabaseConnection,
}

impl HistoryCategorySuggester {
    /// Creates a suggester reading from `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategorySuggester for HistoryCategorySuggester {
    async fn suggest(&self, owner: UserId, merchant_name: &str) -> Option<CategoryId> {
        let key = merchant_key(merchant_name)?;

        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(owner.into_inner()))
            .filter(transactions::Column::CategoryId.is_not_null())
            .filter(
                Expr::expr(Func::lower(Expr::col(transactions::Column::MerchantName)))
                    .like(contains_pattern(&key)),
            )
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(SUGGESTION_WINDOW)
            .all(&self.db)
            .await;

        match rows {
            Ok(rows) => most_common(
                rows.into_iter()
                    .filter_map(|row| row.category_id.map(CategoryId::from_uuid)),
            ),
            Err(err) => {
                tracing::warn!(error = %err, "category suggestion lookup failed");
                None
            }
        }
    }
}
