//! Integration tests for `ItemRepo`: stock rules on edit and delete, and
//! catalog filtering.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sborrowhub_core::error::CoreError;
use sborrowhub_db::error::RepoError;
use sborrowhub_db::models::borrow_request::CreateBorrowRequest;
use sborrowhub_db::models::item::{CreateItem, Item, ItemFilter, UpdateItem};
use sborrowhub_db::models::user::CreateUser;
use sborrowhub_db::repositories::{BorrowRequestRepo, ItemRepo, TransactionRepo, UserRepo};
use sqlx::PgPool;

fn item(name: &str, category: &str, quantity: i32) -> CreateItem {
    CreateItem {
        name: name.to_string(),
        category: category.to_string(),
        description: Some(format!("{name} for coursework")),
        quantity,
        condition: None,
        image_url: None,
    }
}

/// Lend `quantity` units of `item` to a fresh borrower; returns the transaction id.
async fn lend(pool: &PgPool, item: &Item, quantity: i32) -> i64 {
    let borrower = UserRepo::create(
        pool,
        &CreateUser {
            username: format!("borrower{}", item.id),
            email: format!("borrower{}@campus.test", item.id),
            full_name: "Borrower".to_string(),
            password_hash: "x".to_string(),
            role_id: 3,
        },
    )
    .await
    .unwrap();
    let now = Utc::now();
    let request = BorrowRequestRepo::create(
        pool,
        borrower.id,
        &CreateBorrowRequest {
            item_id: item.id,
            quantity,
            borrow_date: now,
            return_date: now + Duration::days(3),
            purpose: "Project".to_string(),
        },
    )
    .await
    .unwrap();
    BorrowRequestRepo::approve(pool, request.id, borrower.id)
        .await
        .unwrap()
        .transaction
        .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_puts_every_unit_on_the_shelf(pool: PgPool) {
    let created = ItemRepo::create(&pool, &item("Oscilloscope", "Lab", 4)).await.unwrap();
    assert_eq!(created.quantity, 4);
    assert_eq!(created.available, 4);
    assert_eq!(created.condition, "good");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_unknown_condition(pool: PgPool) {
    let mut input = item("Oscilloscope", "Lab", 4);
    input.condition = Some("broken".to_string());
    let err = ItemRepo::create(&pool, &input).await.unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn quantity_change_keeps_lent_units_lent(pool: PgPool) {
    let created = ItemRepo::create(&pool, &item("Camera", "Media", 5)).await.unwrap();
    lend(&pool, &created, 3).await;

    let grown = ItemRepo::update(
        &pool,
        created.id,
        &UpdateItem {
            quantity: Some(8),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(grown.quantity, 8);
    assert_eq!(grown.available, 5);

    let too_small = ItemRepo::update(
        &pool,
        created.id,
        &UpdateItem {
            quantity: Some(2),
            ..Default::default()
        },
    )
    .await;
    assert_matches!(too_small, Err(RepoError::Core(CoreError::Conflict(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_missing_item_returns_none(pool: PgPool) {
    let result = ItemRepo::update(&pool, 4242, &UpdateItem::default()).await.unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_refused_while_loan_is_open(pool: PgPool) {
    let created = ItemRepo::create(&pool, &item("Tablet", "Media", 2)).await.unwrap();
    let txn = lend(&pool, &created, 1).await;

    let err = ItemRepo::delete(&pool, created.id).await.unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Conflict(_)));

    TransactionRepo::process_return(&pool, txn, 1, Utc::now(), 0)
        .await
        .unwrap();

    // The loan history still references the item.
    let err = ItemRepo::delete(&pool, created.id).await.unwrap_err();
    assert_matches!(err, RepoError::Database(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_unused_item(pool: PgPool) {
    let created = ItemRepo::create(&pool, &item("Tablet", "Media", 2)).await.unwrap();
    assert!(ItemRepo::delete(&pool, created.id).await.unwrap());
    assert!(!ItemRepo::delete(&pool, created.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_category_search_and_availability(pool: PgPool) {
    ItemRepo::create(&pool, &item("Canon Camera", "Media", 2)).await.unwrap();
    ItemRepo::create(&pool, &item("Tripod", "Media", 1)).await.unwrap();
    let scope = ItemRepo::create(&pool, &item("Microscope", "Lab", 1)).await.unwrap();
    ItemRepo::create(&pool, &item("100% Cotton Gown", "Apparel", 3)).await.unwrap();
    lend(&pool, &scope, 1).await;

    let media = ItemRepo::list(
        &pool,
        &ItemFilter {
            category: Some("Media".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let names: Vec<_> = media.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Canon Camera", "Tripod"]);

    let search = ItemRepo::list(
        &pool,
        &ItemFilter {
            search: Some("camera".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(search.len(), 1);

    // `%` is matched literally.
    let literal = ItemRepo::list(
        &pool,
        &ItemFilter {
            search: Some("0%".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].name, "100% Cotton Gown");

    let on_shelf = ItemRepo::list(
        &pool,
        &ItemFilter {
            available_only: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(on_shelf.iter().all(|i| i.available > 0));
    assert_eq!(on_shelf.len(), 3);

    let categories = ItemRepo::categories(&pool).await.unwrap();
    let counts: Vec<_> = categories
        .iter()
        .map(|c| (c.category.as_str(), c.item_count))
        .collect();
    assert_eq!(counts, [("Apparel", 1), ("Lab", 1), ("Media", 2)]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stock_check_constraint_backs_the_invariant(pool: PgPool) {
    let created = ItemRepo::create(&pool, &item("Cable", "Lab", 2)).await.unwrap();
    let result = sqlx::query("UPDATE items SET available = 3 WHERE id = $1")
        .bind(created.id)
        .execute(&pool)
        .await;
    assert!(result.is_err());
}
