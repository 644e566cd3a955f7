//! Borrower-facing handlers: submitting requests and viewing one's own
//! requests and loans.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sborrowhub_core::error::CoreError;
use sborrowhub_core::lifecycle::{validate_loan_window, RequestStatus, TransactionStatus};
use sborrowhub_core::notifications::EVENT_REQUEST_SUBMITTED;
use sborrowhub_core::roles::can_act_as_officer;
use sborrowhub_core::types::DbId;
use sborrowhub_db::models::borrow_request::{
    BorrowRequest, BorrowRequestDetail, CreateBorrowRequest, RequestFilter,
};
use sborrowhub_db::models::transaction::{TransactionDetail, TransactionFilter};
use sborrowhub_db::repositories::{BorrowRequestRepo, ItemRepo, TransactionRepo};
use sborrowhub_events::PlatformEvent;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::StatusFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// Query parameters for `GET /transactions`.
#[derive(Debug, Default, Deserialize)]
pub struct MyTransactionsQuery {
    pub status: Option<String>,
    /// Only loans whose items are still out.
    #[serde(default)]
    pub open_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/borrow-requests
///
/// Submit a request. Stock is only checked against the item's total here;
/// whether enough units are on the shelf is decided at approval time.
pub async fn create_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BorrowRequest>>)> {
    validate_loan_window(
        input.borrow_date,
        input.return_date,
        state.config.lending.max_loan_days,
    )?;

    let item = ItemRepo::find_by_id(&state.pool, input.item_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Item",
            id: input.item_id,
        }))?;

    if input.quantity > item.quantity {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Requested quantity {} exceeds the {} unit(s) of '{}' owned",
            input.quantity, item.quantity, item.name
        ))));
    }

    if BorrowRequestRepo::has_pending(&state.pool, auth.user_id, item.id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "You already have a pending request for '{}'",
            item.name
        ))));
    }

    let request = BorrowRequestRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        request_id = request.id,
        borrower_id = auth.user_id,
        item_id = item.id,
        quantity = request.quantity,
        "Borrow request submitted"
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_REQUEST_SUBMITTED)
            .with_source("borrow_request", request.id)
            .with_actor(auth.user_id)
            .with_payload(json!({ "item_name": item.name, "quantity": request.quantity })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/borrow-requests
///
/// The caller's own requests, newest first (`?status=` filters).
pub async fn list_my_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<Json<DataResponse<Vec<BorrowRequestDetail>>>> {
    if let Some(status) = params.status.as_deref() {
        status.parse::<RequestStatus>()?;
    }
    let filter = RequestFilter {
        status: params.status,
        limit: params.limit,
        offset: params.offset,
        ..Default::default()
    };
    let requests = BorrowRequestRepo::list_for_borrower(&state.pool, auth.user_id, &filter).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/borrow-requests/{id}
///
/// Borrowers see only their own requests; officers and admins see any.
pub async fn get_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BorrowRequestDetail>>> {
    let request = BorrowRequestRepo::find_detail(&state.pool, id)
        .await?
        .filter(|r| r.borrower_id == auth.user_id || can_act_as_officer(&auth.role))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BorrowRequest",
            id,
        }))?;
    Ok(Json(DataResponse { data: request }))
}

/// GET /api/v1/transactions
///
/// The caller's own loans.
pub async fn list_my_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<MyTransactionsQuery>,
) -> AppResult<Json<DataResponse<Vec<TransactionDetail>>>> {
    if let Some(status) = params.status.as_deref() {
        status.parse::<TransactionStatus>()?;
    }
    let filter = TransactionFilter {
        status: params.status,
        open_only: params.open_only,
        limit: params.limit,
        offset: params.offset,
        ..Default::default()
    };
    let transactions =
        TransactionRepo::list_for_borrower(&state.pool, auth.user_id, &filter).await?;
    Ok(Json(DataResponse { data: transactions }))
}
