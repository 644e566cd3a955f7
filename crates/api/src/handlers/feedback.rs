//! Admin view of user feedback: contact messages and item reviews.

use axum::extract::{Path, Query, State};
use axum::Json;
use sborrowhub_core::error::CoreError;
use sborrowhub_core::feedback::validate_contact_status;
use sborrowhub_core::types::DbId;
use sborrowhub_db::models::contact_message::{ContactMessage, UpdateContactStatus};
use sborrowhub_db::models::review::ReviewDetail;
use sborrowhub_db::repositories::{ContactMessageRepo, ReviewRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::StatusFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validation::ValidatedJson;

#[derive(Debug, Serialize)]
pub struct FeedbackOverview {
    pub contact_messages: Vec<ContactMessage>,
    pub reviews: Vec<ReviewDetail>,
}

/// GET /api/v1/admin/feedback
///
/// `?status=` filters contact messages only; paging applies to both lists.
pub async fn list_feedback(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<Json<DataResponse<FeedbackOverview>>> {
    if let Some(status) = params.status.as_deref() {
        validate_contact_status(status)?;
    }
    let contact_messages = ContactMessageRepo::list(
        &state.pool,
        params.status.as_deref(),
        params.limit,
        params.offset,
    )
    .await?;
    let reviews = ReviewRepo::list_all(&state.pool, params.limit, params.offset).await?;

    Ok(Json(DataResponse {
        data: FeedbackOverview {
            contact_messages,
            reviews,
        },
    }))
}

/// PUT /api/v1/admin/feedback/contact/{id}
pub async fn update_contact_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateContactStatus>,
) -> AppResult<Json<DataResponse<ContactMessage>>> {
    validate_contact_status(&input.status)?;
    let message = ContactMessageRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ContactMessage",
            id,
        }))?;
    tracing::info!(message_id = id, status = %message.status, admin_id = admin.user_id, "Contact message updated");
    Ok(Json(DataResponse { data: message }))
}
