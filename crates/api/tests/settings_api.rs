//! HTTP-level tests for per-user settings.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, login, put_json_auth, user_with_token};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn settings_default_until_changed(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = user_with_token(app.clone(), &pool, "student", "borrower").await;

    let response = get_auth(app, "/api/v1/user/settings", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["theme"], "light");
    assert_eq!(json["data"]["language"], "en");
    assert_eq!(json["data"]["email_notifications"], true);
    assert_eq!(json["data"]["items_per_page"], 12);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn partial_update_keeps_other_fields_and_returns_on_login(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = user_with_token(app.clone(), &pool, "student", "borrower").await;

    let response = put_json_auth(
        app.clone(),
        "/api/v1/user/settings",
        json!({ "theme": "dark" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json_auth(
        app.clone(),
        "/api/v1/user/settings",
        json!({ "items_per_page": 24 }),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["theme"], "dark");
    assert_eq!(json["data"]["items_per_page"], 24);

    let data = login(app, "student").await;
    assert_eq!(data["settings"]["theme"], "dark");
    assert_eq!(data["settings"]["items_per_page"], 24);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_settings_are_rejected_and_not_saved(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_user, token) = user_with_token(app.clone(), &pool, "student", "borrower").await;

    let response = put_json_auth(
        app.clone(),
        "/api/v1/user/settings",
        json!({ "theme": "neon", "items_per_page": 0 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let fields: Vec<&str> = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["items_per_page", "theme"]);

    let json = body_json(get_auth(app, "/api/v1/user/settings", &token).await).await;
    assert_eq!(json["data"]["theme"], "light");
}
