//! Handler for the public contact form.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sborrowhub_db::models::contact_message::{ContactMessage, CreateContactMessage};
use sborrowhub_db::repositories::ContactMessageRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// POST /api/v1/contact
///
/// Anyone may write; a signed-in sender is linked to the message.
pub async fn submit_contact(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    ValidatedJson(input): ValidatedJson<CreateContactMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<ContactMessage>>)> {
    let user_id = auth.map(|a| a.user_id);
    let message = ContactMessageRepo::create(&state.pool, user_id, &input).await?;
    tracing::info!(message_id = message.id, ?user_id, "Contact message received");
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}
