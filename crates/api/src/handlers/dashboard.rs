//! Borrower dashboard.

use axum::extract::State;
use axum::Json;
use sborrowhub_db::models::dashboard::BorrowerSummary;
use sborrowhub_db::models::transaction::{TransactionDetail, TransactionFilter};
use sborrowhub_db::repositories::{DashboardRepo, TransactionRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BorrowerDashboard {
    pub summary: BorrowerSummary,
    /// Loans whose items are still out, newest first.
    pub open_loans: Vec<TransactionDetail>,
}

/// GET /api/v1/user/dashboard
pub async fn borrower_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BorrowerDashboard>>> {
    let summary = DashboardRepo::borrower_summary(&state.pool, auth.user_id).await?;
    let open_loans = TransactionRepo::list_for_borrower(
        &state.pool,
        auth.user_id,
        &TransactionFilter {
            open_only: true,
            ..Default::default()
        },
    )
    .await?;
    Ok(Json(DataResponse {
        data: BorrowerDashboard {
            summary,
            open_loans,
        },
    }))
}
