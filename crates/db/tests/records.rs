//! Integration tests for the passive record repositories: settings,
//! reviews, contact messages, notifications, and snapshot export/restore.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sborrowhub_core::error::CoreError;
use sborrowhub_core::settings::UserPreferences;
use sborrowhub_db::error::RepoError;
use sborrowhub_db::models::borrow_request::CreateBorrowRequest;
use sborrowhub_db::models::contact_message::CreateContactMessage;
use sborrowhub_db::models::item::CreateItem;
use sborrowhub_db::models::notification::CreateNotification;
use sborrowhub_db::models::user::CreateUser;
use sborrowhub_db::repositories::{
    BackupRepo, BorrowRequestRepo, ContactMessageRepo, DashboardRepo, ItemRepo,
    NotificationRepo, ReviewRepo, SettingsRepo, TransactionRepo, UserRepo,
};
use sqlx::PgPool;

async fn new_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@campus.test"),
            full_name: username.to_uppercase(),
            password_hash: "x".to_string(),
            role_id: 3,
        },
    )
    .await
    .unwrap()
    .id
}

/// One item lent to `borrower` and returned; returns (item_id, request_id).
async fn returned_loan(pool: &PgPool, borrower: i64) -> (i64, i64) {
    let item = ItemRepo::create(
        pool,
        &CreateItem {
            name: "Projector".to_string(),
            category: "Media".to_string(),
            description: None,
            quantity: 3,
            condition: Some("new".to_string()),
            image_url: None,
        },
    )
    .await
    .unwrap();
    let now = Utc::now();
    let request = BorrowRequestRepo::create(
        pool,
        borrower,
        &CreateBorrowRequest {
            item_id: item.id,
            quantity: 2,
            borrow_date: now - Duration::days(5),
            return_date: now - Duration::days(1),
            purpose: "Seminar".to_string(),
        },
    )
    .await
    .unwrap();
    let approved = BorrowRequestRepo::approve(pool, request.id, borrower).await.unwrap();
    TransactionRepo::process_return(pool, approved.transaction.id, borrower, now, 250)
        .await
        .unwrap();
    (item.id, request.id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn settings_default_until_saved(pool: PgPool) {
    let user = new_user(&pool, "alice").await;

    let prefs = SettingsRepo::get_or_default(&pool, user).await.unwrap();
    assert_eq!(prefs, UserPreferences::default());

    let dark = UserPreferences {
        theme: "dark".to_string(),
        items_per_page: 24,
        ..UserPreferences::default()
    };
    SettingsRepo::upsert(&pool, user, &dark).await.unwrap();
    let saved = SettingsRepo::upsert(
        &pool,
        user,
        &UserPreferences {
            language: "fr".to_string(),
            ..dark.clone()
        },
    )
    .await
    .unwrap();
    assert_eq!(saved.language, "fr");

    let loaded = SettingsRepo::get_or_default(&pool, user).await.unwrap();
    assert_eq!(loaded.theme, "dark");
    assert_eq!(loaded.items_per_page, 24);
    assert_eq!(loaded.language, "fr");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn one_review_per_request_and_rating_summary(pool: PgPool) {
    let user = new_user(&pool, "alice").await;
    let (item_id, request_id) = returned_loan(&pool, user).await;

    let empty = ReviewRepo::rating_summary(&pool, item_id).await.unwrap();
    assert_eq!(empty.review_count, 0);
    assert!(empty.average_rating.is_none());

    ReviewRepo::create(&pool, user, item_id, request_id, 4, "Worked well")
        .await
        .unwrap();
    let duplicate = ReviewRepo::create(&pool, user, item_id, request_id, 2, "").await;
    assert!(duplicate.is_err());

    let summary = ReviewRepo::rating_summary(&pool, item_id).await.unwrap();
    assert_eq!(summary.review_count, 1);
    assert_eq!(summary.average_rating, Some(4.0));

    let listed = ReviewRepo::list_for_item(&pool, item_id, None, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reviewer_name, "ALICE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn contact_messages_filter_by_status(pool: PgPool) {
    let input = CreateContactMessage {
        name: "Visitor".to_string(),
        email: "visitor@example.com".to_string(),
        subject: "Opening hours".to_string(),
        message: "When is the desk open?".to_string(),
    };
    let first = ContactMessageRepo::create(&pool, None, &input).await.unwrap();
    ContactMessageRepo::create(&pool, None, &input).await.unwrap();
    assert_eq!(first.status, "unread");

    let updated = ContactMessageRepo::update_status(&pool, first.id, "resolved")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "resolved");

    let unread = ContactMessageRepo::list(&pool, Some("unread"), None, None)
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);
    assert!(ContactMessageRepo::update_status(&pool, 999, "read")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn notifications_read_marking_is_per_user(pool: PgPool) {
    let alice = new_user(&pool, "alice").await;
    let bob = new_user(&pool, "bob").await;

    let mut ids = Vec::new();
    for n in 0..3 {
        let created = NotificationRepo::create(
            &pool,
            &CreateNotification {
                user_id: alice,
                kind: "request_approved".to_string(),
                title: format!("Approved #{n}"),
                message: "Your request was approved".to_string(),
                entity_type: Some("borrow_request".to_string()),
                entity_id: Some(n),
            },
        )
        .await
        .unwrap();
        ids.push(created.id);
    }

    assert!(!NotificationRepo::mark_read(&pool, ids[0], bob).await.unwrap());
    assert!(NotificationRepo::mark_read(&pool, ids[0], alice).await.unwrap());
    assert!(!NotificationRepo::mark_read(&pool, ids[0], alice).await.unwrap());
    assert_eq!(NotificationRepo::unread_count(&pool, alice).await.unwrap(), 2);

    let unread = NotificationRepo::list_for_user(&pool, alice, true, None, None)
        .await
        .unwrap();
    assert_eq!(unread.len(), 2);

    assert_eq!(NotificationRepo::mark_all_read(&pool, alice).await.unwrap(), 2);
    assert_eq!(NotificationRepo::unread_count(&pool, alice).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn snapshot_restore_replaces_lending_data(pool: PgPool) {
    let user = new_user(&pool, "alice").await;
    let (item_id, request_id) = returned_loan(&pool, user).await;
    ReviewRepo::create(&pool, user, item_id, request_id, 5, "Great")
        .await
        .unwrap();

    let snapshot = BackupRepo::export(&pool).await.unwrap();
    let counts = snapshot.counts();
    assert_eq!(counts.items, 1);
    assert_eq!(counts.borrow_requests, 1);
    assert_eq!(counts.transactions, 1);
    assert_eq!(counts.reviews, 1);

    // Change data after the snapshot.
    ItemRepo::create(
        &pool,
        &CreateItem {
            name: "Extra".to_string(),
            category: "Misc".to_string(),
            description: None,
            quantity: 1,
            condition: None,
            image_url: None,
        },
    )
    .await
    .unwrap();

    let restored = BackupRepo::restore(&pool, &snapshot).await.unwrap();
    assert_eq!(restored, counts);

    let summary = DashboardRepo::admin_summary(&pool).await.unwrap();
    assert_eq!(summary.items_total, 1);
    assert_eq!(summary.transactions_total, 1);
    assert_eq!(summary.penalties_total, 250);

    // Sequences continue after the restored ids.
    let next = ItemRepo::create(
        &pool,
        &CreateItem {
            name: "After restore".to_string(),
            category: "Misc".to_string(),
            description: None,
            quantity: 1,
            condition: None,
            image_url: None,
        },
    )
    .await
    .unwrap();
    assert!(next.id > item_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn restore_with_unknown_format_changes_nothing(pool: PgPool) {
    let user = new_user(&pool, "alice").await;
    returned_loan(&pool, user).await;

    let mut snapshot = BackupRepo::export(&pool).await.unwrap();
    snapshot.format_version = 99;
    snapshot.items.clear();

    let err = BackupRepo::restore(&pool, &snapshot).await.unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Validation(_)));
    assert_eq!(DashboardRepo::admin_summary(&pool).await.unwrap().items_total, 1);
}
