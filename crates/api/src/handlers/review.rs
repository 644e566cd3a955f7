//! Handler for `POST /reviews`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sborrowhub_core::error::CoreError;
use sborrowhub_core::feedback::ensure_reviewable;
use sborrowhub_core::lifecycle::RequestStatus;
use sborrowhub_db::models::review::{CreateReview, Review};
use sborrowhub_db::repositories::{BorrowRequestRepo, ReviewRepo, TransactionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// POST /api/v1/reviews
///
/// Review a finished loan. Only the borrower may review, only once per
/// request, and only after the items came back.
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateReview>,
) -> AppResult<(StatusCode, Json<DataResponse<Review>>)> {
    let request = BorrowRequestRepo::find_by_id(&state.pool, input.borrow_request_id)
        .await?
        .filter(|r| r.borrower_id == auth.user_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BorrowRequest",
            id: input.borrow_request_id,
        }))?;

    let returned = TransactionRepo::find_by_request(&state.pool, request.id)
        .await?
        .is_some_and(|t| t.actual_return_date.is_some());
    ensure_reviewable(request.state()? == RequestStatus::Approved, returned)?;

    let comment = input.comment.as_deref().map(str::trim).unwrap_or_default();
    let review = ReviewRepo::create(
        &state.pool,
        auth.user_id,
        request.item_id,
        request.id,
        input.rating,
        comment,
    )
    .await?;

    tracing::info!(
        review_id = review.id,
        item_id = review.item_id,
        rating = review.rating,
        "Review submitted"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}
