//! Integration tests for the category tree.

mod common;

use chrono::Utc;
use common::{create_account, setup_db, spend};
use finnit_db::CategoryRepository;
use finnit_db::entities::categories;
use finnit_db::repositories::{CreateCategoryInput, UpdateCategoryInput};
use finnit_shared::AppError;
use finnit_shared::types::{CategoryId, UserId};
use rust_decimal_macros::dec;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

async fn create(
    repo: &CategoryRepository,
    owner: UserId,
    name: &str,
    parent: Option<&categories::Model>,
) -> categories::Model {
    repo.create_category(
        owner,
        CreateCategoryInput {
            name: name.to_string(),
            parent_id: parent.map(|p| CategoryId::from_uuid(p.id)),
            ..CreateCategoryInput::default()
        },
    )
    .await
    .unwrap()
}

/// A shared system category, visible to everyone and owned by no one.
async fn system_default(db: &DatabaseConnection, name: &str) -> categories::Model {
    let now: DateTimeWithTimeZone = Utc::now().into();
    categories::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(None),
        name: Set(name.to_string()),
        parent_id: Set(None),
        is_default: Set(true),
        icon: Set(None),
        color: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

fn reparent(parent: &categories::Model) -> UpdateCategoryInput {
    UpdateCategoryInput {
        parent_id: Some(Some(CategoryId::from_uuid(parent.id))),
        ..UpdateCategoryInput::default()
    }
}

#[tokio::test]
async fn test_indirect_cycle_is_rejected() {
    let db = setup_db().await;
    let owner = UserId::new();
    let repo = CategoryRepository::new(db.clone());

    let a = create(&repo, owner, "A", None).await;
    let b = create(&repo, owner, "B", Some(&a)).await;
    let c = create(&repo, owner, "C", Some(&b)).await;

    let err = repo
        .update_category(owner, CategoryId::from_uuid(a.id), reparent(&c))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    let err = repo
        .update_category(owner, CategoryId::from_uuid(a.id), reparent(&a))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    // Moving a leaf to the root and back is fine.
    let moved = repo
        .update_category(
            owner,
            CategoryId::from_uuid(c.id),
            UpdateCategoryInput {
                parent_id: Some(None),
                ..UpdateCategoryInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.parent_id, None);
    let moved = repo
        .update_category(owner, CategoryId::from_uuid(c.id), reparent(&a))
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(a.id));
}

#[tokio::test]
async fn test_defaults_are_visible_but_immutable() {
    let db = setup_db().await;
    let owner = UserId::new();
    let repo = CategoryRepository::new(db.clone());
    let shared = system_default(&db, "Uncategorized").await;
    let id = CategoryId::from_uuid(shared.id);

    let listed = repo.list_categories(owner).await.unwrap();
    assert!(listed.iter().any(|category| category.id == shared.id));

    let err = repo
        .update_category(
            owner,
            id,
            UpdateCategoryInput {
                name: Some("Mine now".to_string()),
                ..UpdateCategoryInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    let err = repo.delete_category(owner, id).await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    // A default may still parent an owner's category.
    let child = create(&repo, owner, "Misc", Some(&shared)).await;
    assert_eq!(child.parent_id, Some(shared.id));
}

#[tokio::test]
async fn test_sibling_names_are_unique() {
    let db = setup_db().await;
    let owner = UserId::new();
    let repo = CategoryRepository::new(db.clone());
    let food = create(&repo, owner, "Food", None).await;
    let travel = create(&repo, owner, "Travel", None).await;
    create(&repo, owner, "Snacks", Some(&food)).await;

    let err = repo
        .create_category(
            owner,
            CreateCategoryInput {
                name: "Snacks".to_string(),
                parent_id: Some(CategoryId::from_uuid(food.id)),
                ..CreateCategoryInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    // The same name under another parent is fine.
    create(&repo, owner, "Snacks", Some(&travel)).await;
    // So is the same name for another owner.
    create(&repo, UserId::new(), "Food", None).await;
}

#[tokio::test]
async fn test_delete_guards() {
    let db = setup_db().await;
    let owner = UserId::new();
    let repo = CategoryRepository::new(db.clone());
    let parent = create(&repo, owner, "Home", None).await;
    let leaf = create(&repo, owner, "Rent", Some(&parent)).await;
    let unused = create(&repo, owner, "Garden", Some(&parent)).await;

    let account = create_account(&db, owner, "Checking", dec!(1000)).await;
    spend(&db, owner, &account, dec!(800), Some(CategoryId::from_uuid(leaf.id))).await;

    let err = repo
        .delete_category(owner, CategoryId::from_uuid(parent.id))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    let err = repo
        .delete_category(owner, CategoryId::from_uuid(leaf.id))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::Validation(_))));

    repo.delete_category(owner, CategoryId::from_uuid(unused.id))
        .await
        .unwrap();

    let err = repo
        .find_category(UserId::new(), CategoryId::from_uuid(leaf.id))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_seed_default_categories_once() {
    let db = setup_db().await;
    let owner = UserId::new();
    let repo = CategoryRepository::new(db.clone());

    let seeded = repo.seed_default_categories(owner).await.unwrap();
    let expected: usize = finnit_core::category::DEFAULT_CATEGORIES
        .iter()
        .map(|(_, children)| 1 + children.len())
        .sum();
    assert_eq!(seeded.len(), expected);
    assert!(seeded.iter().all(|category| !category.is_default));
    assert!(seeded.iter().all(|category| category.user_id == Some(owner.into_inner())));

    let groceries = seeded.iter().find(|c| c.name == "Groceries").unwrap();
    let food = seeded.iter().find(|c| c.name == "Food & Dining").unwrap();
    assert_eq!(groceries.parent_id, Some(food.id));

    assert!(repo.seed_default_categories(owner).await.unwrap().is_empty());
    assert_eq!(repo.list_categories(owner).await.unwrap().len(), expected);
}

#[tokio::test]
async fn test_usage_totals_per_category() {
    let db = setup_db().await;
    let owner = UserId::new();
    let repo = CategoryRepository::new(db.clone());
    let rent = create(&repo, owner, "Rent", None).await;
    let fun = create(&repo, owner, "Fun", None).await;
    let account = create_account(&db, owner, "Checking", dec!(5000)).await;

    spend(&db, owner, &account, dec!(1200), Some(CategoryId::from_uuid(rent.id))).await;
    spend(&db, owner, &account, dec!(30), Some(CategoryId::from_uuid(fun.id))).await;
    spend(&db, owner, &account, dec!(50), Some(CategoryId::from_uuid(fun.id))).await;
    spend(&db, owner, &account, dec!(99), None).await;

    let usage = repo.category_usage(owner, None, None).await.unwrap();
    assert_eq!(usage.len(), 2);
    assert_eq!(usage[0].name, "Rent");
    assert_eq!(usage[1].total_amount, dec!(80));
    assert_eq!(usage[1].transaction_count, 2);
    assert_eq!(usage[1].average_amount, dec!(40));
}
