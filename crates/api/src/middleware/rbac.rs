//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects callers whose role is not
//! allowed, so a handler's signature states who may call it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sborrowhub_core::error::CoreError;
use sborrowhub_core::roles::{can_act_as_officer, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn list_users(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires `officer` or `admin`. Guards request decisions, returns and
/// inventory management.
pub struct RequireOfficer(pub AuthUser);

impl FromRequestParts<AppState> for RequireOfficer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_act_as_officer(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Officer or Admin role required".into(),
            )));
        }
        Ok(RequireOfficer(user))
    }
}

/// Requires any authenticated user.
///
/// Same as [`AuthUser`], named for route signatures where the intent should
/// read as "signed-in users only".
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
