//! HTTP-level tests for admin backups: export, listing, restore and delete.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    body_json, delete_auth, get, get_auth, post_auth, seed_item, test_config, test_state,
    user_with_token,
};
use sqlx::PgPool;
use tempfile::TempDir;

fn app_with_backups(pool: PgPool, dir: &TempDir) -> Router {
    let config = test_config(dir.path().join("backups"));
    common::build_test_app_with(test_state(pool, config.clone()), &config)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn backup_listing_starts_empty(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let app = app_with_backups(pool.clone(), &dir);
    let (_admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;

    let response = get_auth(app, "/api/v1/admin/backups", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn partial_backups_are_not_listed(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let backups = dir.path().join("backups");
    std::fs::create_dir_all(&backups).unwrap();
    std::fs::write(backups.join(".backup-20240101T000000000Z.json.partial"), b"{\"trunc").unwrap();
    let app = app_with_backups(pool.clone(), &dir);
    let (_admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;

    let json = body_json(get_auth(app.clone(), "/api/v1/admin/backups", &token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let response = post_auth(app.clone(), "/api/v1/admin/backups", &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(get_auth(app, "/api/v1/admin/backups", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    let leftovers = std::fs::read_dir(&backups)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
        .count();
    // Only the pre-existing partial file remains.
    assert_eq!(leftovers, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn backup_and_restore_round_trip(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    seed_item(&pool, "Projector", "Electronics", 2).await;
    let app = app_with_backups(pool.clone(), &dir);
    let (_admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;

    let response = post_auth(app.clone(), "/api/v1/admin/backups", &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let name = json["data"]["name"].as_str().unwrap().to_string();
    assert!(name.starts_with("backup-") && name.ends_with(".json"));
    assert_eq!(json["data"]["counts"]["items"], 1);
    assert!(json["data"]["size_bytes"].as_u64().unwrap() > 0);
    assert!(dir.path().join("backups").join(&name).exists());

    let json = body_json(get_auth(app.clone(), "/api/v1/admin/backups", &token).await).await;
    assert_eq!(json["data"][0]["name"], name.as_str());

    let uri = format!("/api/v1/admin/backups/{name}");
    let json = body_json(get_auth(app.clone(), &uri, &token).await).await;
    assert_eq!(json["data"]["items"][0]["name"], "Projector");
    assert!(json["data"].get("users").is_none());

    // Changes after the snapshot are rolled back by the restore.
    seed_item(&pool, "Tripod", "Photography", 1).await;
    let response = post_auth(app.clone(), &format!("{uri}/restore"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["restored"]["items"], 1);

    let json = body_json(get(app.clone(), "/api/v1/catalog/get-items").await).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Projector");

    // Accounts are not part of the snapshot, so the admin is still signed in.
    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn restored_ids_do_not_collide_with_new_rows(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let original = seed_item(&pool, "Projector", "Electronics", 2).await;
    let app = app_with_backups(pool.clone(), &dir);
    let (_admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;

    let json = body_json(post_auth(app.clone(), "/api/v1/admin/backups", &token).await).await;
    let name = json["data"]["name"].as_str().unwrap().to_string();
    post_auth(app, &format!("/api/v1/admin/backups/{name}/restore"), &token).await;

    let created = seed_item(&pool, "Tripod", "Photography", 1).await;
    assert!(created.id > original.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn backup_names_are_validated(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let app = app_with_backups(pool.clone(), &dir);
    let (_admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;

    let response = get_auth(app.clone(), "/api/v1/admin/backups/passwords.txt", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(
        app.clone(),
        "/api/v1/admin/backups/backup-20240101T000000000Z.json",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_auth(
        app,
        "/api/v1/admin/backups/backup-20240101T000000000Z.json/restore",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn corrupt_backup_is_refused_without_touching_data(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    seed_item(&pool, "Projector", "Electronics", 2).await;
    let app = app_with_backups(pool.clone(), &dir);
    let (_admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;

    let backups = dir.path().join("backups");
    std::fs::create_dir_all(&backups).unwrap();
    std::fs::write(backups.join("backup-20240101T000000000Z.json"), b"{ not json").unwrap();

    let response = post_auth(
        app.clone(),
        "/api/v1/admin/backups/backup-20240101T000000000Z.json/restore",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(app, "/api/v1/catalog/get-items").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn backups_are_admin_only(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let app = app_with_backups(pool.clone(), &dir);
    let (_officer, token) = user_with_token(app.clone(), &pool, "officer", "officer").await;

    let response = post_auth(app, "/api/v1/admin/backups", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
