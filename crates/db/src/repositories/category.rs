//! Category repository: the per-owner category tree and usage totals.
//!
//! An owner sees their own categories plus the shared system defaults
//! (`user_id IS NULL AND is_default`). Defaults are read-only.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use finnit_core::category::{
    CategorizedLine, CategoryError, CategorySpend, DEFAULT_CATEGORIES, ensure_valid_parent,
    summarize_usage,
};
use finnit_shared::AppError;
use finnit_shared::types::{CategoryId, UserId};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::required_name;
use crate::entities::{
    budget_categories, categories, sea_orm_active_enums::TransactionType, transactions,
};
use crate::error::{StoreError, StoreResult};

/// Input for creating a category.
#[derive(Debug, Clone, Default)]
pub struct CreateCategoryInput {
    /// Display name, unique among its siblings.
    pub name: String,
    /// Parent category; owned or a system default.
    pub parent_id: Option<CategoryId>,
    /// Icon name.
    pub icon: Option<String>,
    /// Hex colour.
    pub color: Option<String>,
}

/// Input for updating a category.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// New name.
    pub name: Option<String>,
    /// New parent; `Some(None)` moves the category to the top level.
    pub parent_id: Option<Option<CategoryId>>,
    /// New icon.
    pub icon: Option<Option<String>>,
    /// New colour.
    pub color: Option<Option<String>>,
}

/// Category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the owner's categories and the system defaults, by name.
    pub async fn list_categories(&self, owner: UserId) -> StoreResult<Vec<categories::Model>> {
        Ok(categories::Entity::find()
            .filter(visible_to(owner))
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds a category visible to `owner`.
    pub async fn find_category(
        &self,
        owner: UserId,
        category_id: CategoryId,
    ) -> StoreResult<categories::Model> {
        visible_category(&self.db, owner, category_id.into_inner()).await
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown parent and `Validation` for a blank
    /// or duplicate name.
    pub async fn create_category(
        &self,
        owner: UserId,
        input: CreateCategoryInput,
    ) -> StoreResult<categories::Model> {
        let name = required_name(&input.name, "Category")?;
        let parent_id = match input.parent_id {
            Some(parent_id) => Some(self.visible_parent(owner, parent_id).await?),
            None => None,
        };
        self.ensure_unique_name(owner, parent_id, &name, None).await?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let category = categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(Some(owner.into_inner())),
            name: Set(name),
            parent_id: Set(parent_id),
            is_default: Set(false),
            icon: Set(input.icon),
            color: Set(input.color),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    /// Updates a category, re-checking the tree when the parent changes.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for default categories, self-parenting, cycles
    /// and duplicate names.
    pub async fn update_category(
        &self,
        owner: UserId,
        category_id: CategoryId,
        input: UpdateCategoryInput,
    ) -> StoreResult<categories::Model> {
        let category = self.find_category(owner, category_id).await?;
        if category.is_default {
            return Err(AppError::from(CategoryError::DefaultImmutable).into());
        }

        let parent_id = match input.parent_id {
            Some(Some(parent_id)) => {
                if parent_id == category_id {
                    return Err(AppError::from(CategoryError::SelfParent).into());
                }
                let parent = self.visible_parent(owner, parent_id).await?;
                let tree = self.parent_map(owner).await?;
                ensure_valid_parent(category_id, parent_id, |node| {
                    tree.get(&node).copied().flatten()
                })
                .map_err(AppError::from)?;
                Some(parent)
            }
            Some(None) => None,
            None => category.parent_id,
        };

        let name = match &input.name {
            Some(name) => required_name(name, "Category")?,
            None => category.name.clone(),
        };
        if name != category.name || parent_id != category.parent_id {
            self.ensure_unique_name(owner, parent_id, &name, Some(category.id))
                .await?;
        }

        let mut active: categories::ActiveModel = category.into();
        active.name = Set(name);
        active.parent_id = Set(parent_id);
        if let Some(icon) = input.icon {
            active.icon = Set(icon);
        }
        if let Some(color) = input.color {
            active.color = Set(color);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes an unused leaf category.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for defaults, categories with children, and
    /// categories referenced by transactions or budget caps.
    pub async fn delete_category(&self, owner: UserId, category_id: CategoryId) -> StoreResult<()> {
        let category = self.find_category(owner, category_id).await?;
        if category.is_default {
            return Err(AppError::from(CategoryError::DefaultImmutable).into());
        }

        let children = categories::Entity::find()
            .filter(categories::Column::ParentId.eq(category.id))
            .count(&self.db)
            .await?;
        if children > 0 {
            return Err(AppError::from(CategoryError::HasChildren).into());
        }

        let transaction_uses = transactions::Entity::find()
            .filter(transactions::Column::CategoryId.eq(category.id))
            .count(&self.db)
            .await?;
        let cap_uses = budget_categories::Entity::find()
            .filter(budget_categories::Column::CategoryId.eq(category.id))
            .count(&self.db)
            .await?;
        if transaction_uses > 0 || cap_uses > 0 {
            return Err(AppError::from(CategoryError::InUse).into());
        }

        categories::Entity::delete_by_id(category.id)
            .exec(&self.db)
            .await?;
        tracing::info!(category_id = %category.id, "category deleted");
        Ok(())
    }

    /// Per-category totals over an optional date range, transfers excluded.
    pub async fn category_usage(
        &self,
        owner: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> StoreResult<Vec<CategorySpend>> {
        let names: HashMap<Uuid, String> = self
            .list_categories(owner)
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(owner.into_inner()))
            .filter(transactions::Column::CategoryId.is_not_null())
            .filter(transactions::Column::TransactionType.ne(TransactionType::Transfer));
        if let Some(from) = from {
            query = query.filter(transactions::Column::TransactionDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(transactions::Column::TransactionDate.lte(to));
        }
        let rows = query.all(&self.db).await?;

        let lines = rows.into_iter().filter_map(|row| {
            let category_id = row.category_id?;
            Some(CategorizedLine {
                category_id: CategoryId::from_uuid(category_id),
                name: names.get(&category_id)?.clone(),
                kind: row.transaction_type.into(),
                amount: row.amount,
            })
        });
        Ok(summarize_usage(lines))
    }

    /// Gives a new owner their own copy of the starter tree.
    ///
    /// Does nothing when the owner already has categories.
    pub async fn seed_default_categories(
        &self,
        owner: UserId,
    ) -> StoreResult<Vec<categories::Model>> {
        let existing = categories::Entity::find()
            .filter(categories::Column::UserId.eq(owner.into_inner()))
            .count(&self.db)
            .await?;
        if existing > 0 {
            tracing::debug!(%owner, existing, "categories already present, skipping seed");
            return Ok(Vec::new());
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = self.db.begin().await?;
        let mut created = Vec::new();

        for (parent_name, children) in DEFAULT_CATEGORIES {
            let parent = new_category(owner, parent_name, None, now).insert(&txn).await?;
            for child_name in *children {
                let child = new_category(owner, child_name, Some(parent.id), now)
                    .insert(&txn)
                    .await?;
                created.push(child);
            }
            created.push(parent);
        }

        txn.commit().await?;
        tracing::info!(%owner, count = created.len(), "default categories seeded");
        Ok(created)
    }

    async fn visible_parent(&self, owner: UserId, parent_id: CategoryId) -> StoreResult<Uuid> {
        match visible_category(&self.db, owner, parent_id.into_inner()).await {
            Ok(parent) => Ok(parent.id),
            Err(StoreError::Domain(AppError::NotFound(_))) => {
                Err(StoreError::not_found("Parent category not found"))
            }
            Err(err) => Err(err),
        }
    }

    async fn parent_map(&self, owner: UserId) -> StoreResult<HashMap<CategoryId, Option<CategoryId>>> {
        Ok(self
            .list_categories(owner)
            .await?
            .into_iter()
            .map(|category| {
                (
                    CategoryId::from_uuid(category.id),
                    category.parent_id.map(CategoryId::from_uuid),
                )
            })
            .collect())
    }

    async fn ensure_unique_name(
        &self,
        owner: UserId,
        parent_id: Option<Uuid>,
        name: &str,
        exclude: Option<Uuid>,
    ) -> StoreResult<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::UserId.eq(owner.into_inner()))
            .filter(categories::Column::Name.eq(name));
        query = match parent_id {
            Some(parent_id) => query.filter(categories::Column::ParentId.eq(parent_id)),
            None => query.filter(categories::Column::ParentId.is_null()),
        };
        if let Some(exclude) = exclude {
            query = query.filter(categories::Column::Id.ne(exclude));
        }

        if query.count(&self.db).await? > 0 {
            return Err(AppError::from(CategoryError::DuplicateName).into());
        }
        Ok(())
    }
}

fn visible_to(owner: UserId) -> Condition {
    Condition::any()
        .add(categories::Column::UserId.eq(owner.into_inner()))
        .add(
            Condition::all()
                .add(categories::Column::UserId.is_null())
                .add(categories::Column::IsDefault.eq(true)),
        )
}

/// Loads a category the owner may use: their own or a system default.
pub(crate) async fn visible_category<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    category_id: Uuid,
) -> StoreResult<categories::Model> {
    categories::Entity::find_by_id(category_id)
        .filter(visible_to(owner))
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Category not found"))
}

fn new_category(
    owner: UserId,
    name: &str,
    parent_id: Option<Uuid>,
    now: DateTimeWithTimeZone,
) -> categories::ActiveModel {
    categories::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(Some(owner.into_inner())),
        name: Set(name.to_string()),
        parent_id: Set(parent_id),
        is_default: Set(false),
        icon: Set(None),
        color: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
}
