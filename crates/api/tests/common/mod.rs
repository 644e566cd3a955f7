#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use sborrowhub_api::auth::jwt::JwtConfig;
use sborrowhub_api::auth::password::hash_password;
use sborrowhub_api::config::{BackupConfig, LendingConfig, ServerConfig};
use sborrowhub_api::router::build_app_router;
use sborrowhub_api::state::AppState;
use sborrowhub_core::types::DbId;
use sborrowhub_db::models::item::{CreateItem, Item};
use sborrowhub_db::models::user::{CreateUser, User};
use sborrowhub_db::repositories::{ItemRepo, RoleRepo, UserRepo};
use sborrowhub_events::EventBus;

pub const TEST_PASSWORD: &str = "borrow-test-pw-1";

/// A `ServerConfig` with fixed secrets and lending rules.
///
/// Late penalty is 500 per day; backups go to `backup_dir`.
pub fn test_config(backup_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "sborrowhub-integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        lending: LendingConfig {
            late_penalty_per_day: 500,
            max_loan_days: 30,
            overdue_sweep_interval_secs: 3600,
        },
        backup: BackupConfig { dir: backup_dir },
    }
}

/// State with a fresh event bus, so a test can subscribe before acting.
pub fn test_state(pool: PgPool, config: ServerConfig) -> AppState {
    AppState {
        pool,
        config: Arc::new(config),
        event_bus: Arc::new(EventBus::default()),
    }
}

/// The full application router over `pool`, with the same middleware stack
/// the binary uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config(std::env::temp_dir().join("sborrowhub-unused-backups"));
    build_test_app_with(test_state(pool, config.clone()), &config)
}

pub fn build_test_app_with(state: AppState, config: &ServerConfig) -> Router {
    build_app_router(state, config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

/// POST without a body.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(token)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), Some(token)).await
}

pub async fn patch_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, None, Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some(token)).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with `role` (`admin`, `officer`, `borrower`) and
/// [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@campus.test"),
            full_name: format!("{username} tester"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

/// Log in through the API and return the `data` object.
pub async fn login(app: Router, username: &str) -> Value {
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": username, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["data"].clone()
}

/// Create a user and return `(user, access_token)`.
pub async fn user_with_token(app: Router, pool: &PgPool, username: &str, role: &str) -> (User, String) {
    let user = create_user(pool, username, role).await;
    let data = login(app, username).await;
    let token = data["access_token"].as_str().unwrap().to_string();
    (user, token)
}

pub async fn seed_item(pool: &PgPool, name: &str, category: &str, quantity: i32) -> Item {
    ItemRepo::create(
        pool,
        &CreateItem {
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            quantity,
            condition: None,
            image_url: None,
        },
    )
    .await
    .unwrap()
}

/// Body for a borrow request starting now and lasting `days` days.
pub fn request_body(item_id: DbId, quantity: i32, days: i64) -> Value {
    let borrow = Utc::now();
    json!({
        "item_id": item_id,
        "quantity": quantity,
        "borrow_date": borrow,
        "return_date": borrow + Duration::days(days),
        "purpose": "Lab session",
    })
}
