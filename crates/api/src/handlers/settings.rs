//! Handlers for `/user/settings`.

use axum::extract::State;
use axum::Json;
use sborrowhub_core::settings::{PreferencesPatch, UserPreferences};
use sborrowhub_db::repositories::SettingsRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/user/settings
///
/// Stored preferences, or the defaults if the user never saved any.
pub async fn get_settings(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserPreferences>>> {
    let prefs = SettingsRepo::get_or_default(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: prefs }))
}

/// PUT /api/v1/user/settings
///
/// Partial update: absent fields keep their current value. The merged result
/// is validated as a whole before it is saved.
pub async fn update_settings(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> AppResult<Json<DataResponse<UserPreferences>>> {
    let current = SettingsRepo::get_or_default(&state.pool, auth.user_id).await?;
    let merged = current.merged(patch);
    merged.validate()?;

    let saved = SettingsRepo::upsert(&state.pool, auth.user_id, &merged).await?;
    tracing::debug!(user_id = auth.user_id, theme = %saved.theme, "Settings saved");
    Ok(Json(DataResponse { data: saved }))
}
