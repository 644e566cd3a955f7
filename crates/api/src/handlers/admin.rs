//! Handlers for `/admin` user and role management, plus the admin dashboard.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sborrowhub_core::error::CoreError;
use sborrowhub_core::roles::{DEFAULT_ROLE, ROLE_ADMIN};
use sborrowhub_core::types::DbId;
use sborrowhub_db::models::dashboard::{AdminSummary, CategoryUsage, PopularItem};
use sborrowhub_db::models::role::Role;
use sborrowhub_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use sborrowhub_db::repositories::{DashboardRepo, RoleRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// Number of entries in the dashboard's most-borrowed list.
const POPULAR_ITEMS_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    pub password: String,
    /// Role name; defaults to `borrower`.
    pub role: Option<String>,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// Query parameters for `GET /admin/users`.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    /// Matches username, email or full name.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub summary: AdminSummary,
    pub categories: Vec<CategoryUsage>,
    pub popular_items: Vec<PopularItem>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = find_role(&state, input.role.as_deref().unwrap_or(DEFAULT_ROLE)).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            full_name: input.full_name.trim().to_string(),
            password_hash,
            role_id: role.id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %role.name, admin_id = admin.user_id, "User created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from_user(&user, role.name),
        }),
    ))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UserQuery>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(
        &state.pool,
        params.search.as_deref(),
        params.limit,
        params.offset,
    )
    .await?;

    // One roles query instead of one per user.
    let roles = RoleRepo::list(&state.pool).await?;
    let responses = users
        .iter()
        .map(|u| {
            let role = roles
                .iter()
                .find(|r| r.id == u.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            UserResponse::from_user(u, role)
        })
        .collect();

    Ok(Json(DataResponse { data: responses }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse {
        data: user_to_response(&state, &user).await?,
    }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Profile fields and activation. Roles change through `/role`.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == admin.user_id && input.is_active == Some(false) {
        return Err(AppError::Core(CoreError::Conflict(
            "Admins cannot deactivate their own account".into(),
        )));
    }

    let user = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            username: input.username.map(|s| s.trim().to_string()),
            email: input.email.map(|s| s.trim().to_lowercase()),
            full_name: input.full_name.map(|s| s.trim().to_string()),
            role_id: None,
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if !user.is_active {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    Ok(Json(DataResponse {
        data: user_to_response(&state, &user).await?,
    }))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// The new role applies from the user's next login or token refresh.
pub async fn update_user_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role = find_role(&state, input.role.trim()).await?;

    if id == admin.user_id && role.name != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Conflict(
            "Admins cannot remove their own admin role".into(),
        )));
    }

    let user = UserRepo::update_role(&state.pool, id, role.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, role = %role.name, admin_id = admin.user_id, "User role changed");
    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, role.name),
    }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Deactivates rather than deletes: loan history keeps its borrower.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Conflict(
            "Admins cannot deactivate their own account".into(),
        )));
    }
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, admin_id = admin.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &hashed).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Roles and dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<AdminDashboard>>> {
    let summary = DashboardRepo::admin_summary(&state.pool).await?;
    let categories = DashboardRepo::category_usage(&state.pool).await?;
    let popular_items = DashboardRepo::popular_items(&state.pool, POPULAR_ITEMS_LIMIT).await?;
    Ok(Json(DataResponse {
        data: AdminDashboard {
            summary,
            categories,
            popular_items,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_role(state: &AppState, name: &str) -> AppResult<Role> {
    RoleRepo::find_by_name(&state.pool, name)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role '{name}'"))))
}

async fn user_to_response(state: &AppState, user: &User) -> AppResult<UserResponse> {
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(UserResponse::from_user(user, role))
}
