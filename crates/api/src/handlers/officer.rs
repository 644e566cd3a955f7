//! Handlers for the `/officer` resource: request decisions, returns and the
//! loan ledger.
//!
//! All handlers require [`RequireOfficer`]. Every state change publishes a
//! lifecycle event after its database transaction has committed.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use sborrowhub_core::lifecycle::{RequestDecision, RequestStatus, TransactionStatus};
use sborrowhub_core::notifications::{
    EVENT_REQUEST_APPROVED, EVENT_REQUEST_REJECTED, EVENT_TRANSACTION_RETURNED,
};
use sborrowhub_core::types::DbId;
use sborrowhub_db::models::borrow_request::{
    BorrowRequest, BorrowRequestDetail, RequestFilter, UpdateRequestStatus,
};
use sborrowhub_db::models::dashboard::{CategoryUsage, OfficerSummary, PopularItem};
use sborrowhub_db::models::transaction::{
    ReturnItems, ReturnResult, Transaction, TransactionDetail, TransactionFilter,
};
use sborrowhub_db::repositories::{BorrowRequestRepo, DashboardRepo, ItemRepo, TransactionRepo};
use sborrowhub_events::PlatformEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::background::overdue_sweeper;
use crate::error::AppResult;
use crate::middleware::rbac::RequireOfficer;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// Number of entries in the dashboard's most-borrowed list.
const POPULAR_ITEMS_LIMIT: i64 = 5;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /officer/get-all-requests`.
#[derive(Debug, Default, Deserialize)]
pub struct RequestQuery {
    pub status: Option<String>,
    pub borrower_id: Option<DbId>,
    pub item_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /officer/get-all-transactions`.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub status: Option<String>,
    pub borrower_id: Option<DbId>,
    #[serde(default)]
    pub open_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Result of a request decision. `transaction` is set for approvals.
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub request: BorrowRequest,
    pub transaction: Option<Transaction>,
    /// Units left on the shelf after the decision.
    pub item_available: i32,
}

#[derive(Debug, Serialize)]
pub struct OverdueRefresh {
    pub flagged: usize,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct OfficerDashboard {
    pub summary: OfficerSummary,
    pub categories: Vec<CategoryUsage>,
    pub popular_items: Vec<PopularItem>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// GET /api/v1/officer/get-all-requests
pub async fn list_requests(
    State(state): State<AppState>,
    RequireOfficer(_officer): RequireOfficer,
    Query(params): Query<RequestQuery>,
) -> AppResult<Json<DataResponse<Vec<BorrowRequestDetail>>>> {
    if let Some(status) = params.status.as_deref() {
        status.parse::<RequestStatus>()?;
    }
    let filter = RequestFilter {
        status: params.status,
        borrower_id: params.borrower_id,
        item_id: params.item_id,
        limit: params.limit,
        offset: params.offset,
    };
    let requests = BorrowRequestRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// PUT /api/v1/officer/update-request-status/{id}
///
/// Body `{ "status": "approved" }` or
/// `{ "status": "rejected", "rejection_reason": "..." }`.
///
/// Approval decrements stock and opens a transaction atomically; it fails
/// with 409 and changes nothing when too few units are on the shelf or the
/// request was already decided. A rejection without a reason is a 400
/// before anything is read.
pub async fn update_request_status(
    State(state): State<AppState>,
    RequireOfficer(officer): RequireOfficer,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateRequestStatus>,
) -> AppResult<Json<DataResponse<DecisionResponse>>> {
    let decision = RequestDecision::parse(&input.status, input.rejection_reason.as_deref())?;

    let response = match decision {
        RequestDecision::Approve => {
            let outcome = BorrowRequestRepo::approve(&state.pool, id, officer.user_id).await?;
            tracing::info!(
                request_id = id,
                transaction_id = outcome.transaction.id,
                item_id = outcome.item.id,
                available = outcome.item.available,
                officer_id = officer.user_id,
                "Borrow request approved"
            );
            state.event_bus.publish(
                PlatformEvent::new(EVENT_REQUEST_APPROVED)
                    .with_source("borrow_request", id)
                    .with_actor(officer.user_id)
                    .for_user(outcome.request.borrower_id)
                    .with_payload(json!({
                        "item_name": outcome.item.name,
                        "quantity": outcome.request.quantity,
                        "transaction_id": outcome.transaction.id,
                    })),
            );
            DecisionResponse {
                item_available: outcome.item.available,
                request: outcome.request,
                transaction: Some(outcome.transaction),
            }
        }
        RequestDecision::Reject { reason } => {
            let request =
                BorrowRequestRepo::reject(&state.pool, id, officer.user_id, &reason).await?;
            let item = ItemRepo::find_by_id(&state.pool, request.item_id).await?;
            tracing::info!(request_id = id, officer_id = officer.user_id, "Borrow request rejected");
            state.event_bus.publish(
                PlatformEvent::new(EVENT_REQUEST_REJECTED)
                    .with_source("borrow_request", id)
                    .with_actor(officer.user_id)
                    .for_user(request.borrower_id)
                    .with_payload(json!({
                        "item_name": item.as_ref().map(|i| i.name.as_str()),
                        "quantity": request.quantity,
                        "rejection_reason": reason,
                    })),
            );
            DecisionResponse {
                item_available: item.map(|i| i.available).unwrap_or_default(),
                request,
                transaction: None,
            }
        }
    };

    Ok(Json(DataResponse { data: response }))
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// GET /api/v1/officer/get-all-transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    RequireOfficer(_officer): RequireOfficer,
    Query(params): Query<TransactionQuery>,
) -> AppResult<Json<DataResponse<Vec<TransactionDetail>>>> {
    if let Some(status) = params.status.as_deref() {
        status.parse::<TransactionStatus>()?;
    }
    let filter = TransactionFilter {
        status: params.status,
        borrower_id: params.borrower_id,
        open_only: params.open_only,
        limit: params.limit,
        offset: params.offset,
    };
    let transactions = TransactionRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: transactions }))
}

/// POST /api/v1/officer/transactions/{id}/return
///
/// Mark the items of a loan as returned. The optional body may carry
/// `actual_return_date`; it defaults to now. Late returns record the
/// overdue days and the penalty.
pub async fn return_items(
    State(state): State<AppState>,
    RequireOfficer(officer): RequireOfficer,
    Path(id): Path<DbId>,
    body: Option<Json<ReturnItems>>,
) -> AppResult<Json<DataResponse<ReturnResult>>> {
    let returned_at = body
        .and_then(|Json(b)| b.actual_return_date)
        .unwrap_or_else(Utc::now);

    let result = TransactionRepo::process_return(
        &state.pool,
        id,
        officer.user_id,
        returned_at,
        state.config.lending.late_penalty_per_day,
    )
    .await?;

    let txn = &result.transaction;
    tracing::info!(
        transaction_id = id,
        status = %txn.status,
        days_overdue = txn.days_overdue,
        penalty_amount = txn.penalty_amount,
        available = result.item.available,
        officer_id = officer.user_id,
        "Items returned"
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_TRANSACTION_RETURNED)
            .with_source("transaction", id)
            .with_actor(officer.user_id)
            .for_user(txn.borrower_id)
            .with_payload(json!({
                "item_name": result.item.name,
                "quantity": txn.quantity_borrowed,
                "days_overdue": txn.days_overdue,
                "penalty_amount": txn.penalty_amount,
            })),
    );

    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/officer/refresh-overdue
///
/// Run the overdue sweep now instead of waiting for the background task.
pub async fn refresh_overdue(
    State(state): State<AppState>,
    RequireOfficer(officer): RequireOfficer,
) -> AppResult<Json<DataResponse<OverdueRefresh>>> {
    let flagged =
        overdue_sweeper::sweep(&state.pool, &state.event_bus, Utc::now(), Some(officer.user_id))
            .await?;
    tracing::info!(flagged = flagged.len(), officer_id = officer.user_id, "Overdue refresh");
    Ok(Json(DataResponse {
        data: OverdueRefresh {
            flagged: flagged.len(),
            transactions: flagged,
        },
    }))
}

/// GET /api/v1/officer/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireOfficer(_officer): RequireOfficer,
) -> AppResult<Json<DataResponse<OfficerDashboard>>> {
    let summary = DashboardRepo::officer_summary(&state.pool, Utc::now()).await?;
    let categories = DashboardRepo::category_usage(&state.pool).await?;
    let popular_items = DashboardRepo::popular_items(&state.pool, POPULAR_ITEMS_LIMIT).await?;
    Ok(Json(DataResponse {
        data: OfficerDashboard {
            summary,
            categories,
            popular_items,
        },
    }))
}
