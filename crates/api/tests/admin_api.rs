//! HTTP-level tests for admin user management, roles, feedback and the
//! admin dashboard.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, login, post_json, post_json_auth, put_json_auth,
    user_with_token,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_creates_users_with_a_role(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;

    let body = json!({
        "username": "newofficer",
        "email": "NewOfficer@Campus.Test",
        "full_name": "New Officer",
        "password": "officer-password",
        "role": "officer",
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/users", body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "officer");
    assert_eq!(json["data"]["email"], "newofficer@campus.test");
    assert!(json["data"]["is_active"].as_bool().unwrap());

    let body = json!({
        "username": "defaultrole",
        "email": "defaultrole@campus.test",
        "full_name": "Default Role",
        "password": "borrower-password",
    });
    let json = body_json(post_json_auth(app.clone(), "/api/v1/admin/users", body, &token).await).await;
    assert_eq!(json["data"]["role"], "borrower");

    let body = json!({
        "username": "badrole",
        "email": "badrole@campus.test",
        "full_name": "Bad Role",
        "password": "borrower-password",
        "role": "superuser",
    });
    let response = post_json_auth(app, "/api/v1/admin/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_lists_and_searches_users(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;
    common::create_user(&pool, "marie", "borrower").await;
    common::create_user(&pool, "pierre", "officer").await;

    let json = body_json(get_auth(app.clone(), "/api/v1/admin/users", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let json = body_json(get_auth(app, "/api/v1/admin/users?search=MAR", &token).await).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "marie");
    assert!(users[0].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_change_applies_on_next_login(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_admin, admin) = user_with_token(app.clone(), &pool, "root", "admin").await;
    let (user, token) = user_with_token(app.clone(), &pool, "promoted", "borrower").await;

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}/role", user.id),
        json!({ "role": "officer" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "officer");

    // The old token still carries the old role.
    let response = get_auth(app.clone(), "/api/v1/officer/get-all-requests", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let data = login(app.clone(), "promoted").await;
    let token = data["access_token"].as_str().unwrap();
    let response = get_auth(app, "/api/v1/officer/get-all-requests", token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_cannot_lock_themselves_out(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;
    let own = format!("/api/v1/admin/users/{}", admin.id);

    let response = delete_auth(app.clone(), &own, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(app.clone(), &own, json!({ "is_active": false }), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(
        app,
        &format!("{own}/role"),
        json!({ "role": "borrower" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_user_loses_sessions(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_admin, admin) = user_with_token(app.clone(), &pool, "root", "admin").await;
    common::create_user(&pool, "leaving", "borrower").await;
    let session = login(app.clone(), "leaving").await;
    let user_id = session["user"]["id"].as_i64().unwrap();

    let response = delete_auth(app.clone(), &format!("/api/v1/admin/users/{user_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = json!({ "refresh_token": session["refresh_token"] });
    let response = post_json(app.clone(), "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(get_auth(app.clone(), &format!("/api/v1/admin/users/{user_id}"), &admin).await).await;
    assert_eq!(json["data"]["is_active"], false);

    let response = delete_auth(app, "/api/v1/admin/users/999999", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_reset_replaces_the_credential(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_admin, admin) = user_with_token(app.clone(), &pool, "root", "admin").await;
    let user = common::create_user(&pool, "forgetful", "borrower").await;
    let uri = format!("/api/v1/admin/users/{}/reset-password", user.id);

    let response = post_json_auth(app.clone(), &uri, json!({ "new_password": "short" }), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &uri,
        json!({ "new_password": "a-brand-new-secret" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = json!({ "username": "forgetful", "password": "a-brand-new-secret" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn roles_are_seeded(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_admin, token) = user_with_token(app.clone(), &pool, "root", "admin").await;

    let json = body_json(get_auth(app, "/api/v1/admin/roles", &token).await).await;

    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["admin", "officer", "borrower"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn officer_is_not_an_admin(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_officer, token) = user_with_token(app.clone(), &pool, "officer", "officer").await;

    let response = get_auth(app, "/api/v1/admin/dashboard", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn contact_messages_flow_to_admin_feedback(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_admin, admin) = user_with_token(app.clone(), &pool, "root", "admin").await;
    let (user, borrower) = user_with_token(app.clone(), &pool, "asker", "borrower").await;

    let message = json!({
        "name": "Visitor",
        "email": "visitor@example.com",
        "subject": "Opening hours",
        "message": "When is the desk open?",
    });
    let response = post_json(app.clone(), "/api/v1/contact", message.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["data"]["user_id"].is_null());
    assert_eq!(json["data"]["status"], "unread");

    let response = post_json_auth(app.clone(), "/api/v1/contact", message, &borrower).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["user_id"], user.id);
    let message_id = json["data"]["id"].as_i64().unwrap();

    let bad = json!({ "name": "", "email": "nope", "subject": "x", "message": "y" });
    let response = post_json(app.clone(), "/api/v1/contact", bad).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get_auth(app.clone(), "/api/v1/admin/feedback", &admin).await).await;
    assert_eq!(json["data"]["contact_messages"].as_array().unwrap().len(), 2);
    assert!(json["data"]["reviews"].as_array().unwrap().is_empty());

    let uri = format!("/api/v1/admin/feedback/contact/{message_id}");
    let response = put_json_auth(app.clone(), &uri, json!({ "status": "archived" }), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(app.clone(), &uri, json!({ "status": "resolved" }), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(
        get_auth(app.clone(), "/api/v1/admin/feedback?status=unread", &admin).await,
    )
    .await;
    assert_eq!(json["data"]["contact_messages"].as_array().unwrap().len(), 1);

    let json = body_json(get_auth(app, "/api/v1/admin/dashboard", &admin).await).await;
    assert_eq!(json["data"]["summary"]["unread_contact_messages"], 1);
    assert_eq!(json["data"]["summary"]["users_total"], 2);
}
