//! Route definitions for the `/officer` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::officer;
use crate::state::AppState;

/// Routes mounted at `/officer`. Officer or admin role required.
///
/// ```text
/// GET  /get-all-requests                -> list_requests (?status, borrower_id, item_id, limit, offset)
/// PUT  /update-request-status/{id}      -> update_request_status
/// GET  /get-all-transactions            -> list_transactions (?status, borrower_id, open_only, ...)
/// POST /transactions/{id}/return        -> return_items
/// POST /refresh-overdue                 -> refresh_overdue
/// GET  /dashboard                       -> dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-all-requests", get(officer::list_requests))
        .route(
            "/update-request-status/{id}",
            put(officer::update_request_status),
        )
        .route("/get-all-transactions", get(officer::list_transactions))
        .route("/transactions/{id}/return", post(officer::return_items))
        .route("/refresh-overdue", post(officer::refresh_overdue))
        .route("/dashboard", get(officer::dashboard))
}
