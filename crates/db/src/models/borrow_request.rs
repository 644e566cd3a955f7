//! Borrow request model and DTOs.

use sborrowhub_core::error::CoreError;
use sborrowhub_core::lifecycle::RequestStatus;
use sborrowhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::item::Item;
use crate::models::transaction::Transaction;

/// A row from the `borrow_requests` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub id: DbId,
    pub borrower_id: DbId,
    pub item_id: DbId,
    pub quantity: i32,
    pub borrow_date: Timestamp,
    pub return_date: Timestamp,
    pub purpose: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BorrowRequest {
    /// Typed lifecycle state of this request.
    pub fn state(&self) -> Result<RequestStatus, CoreError> {
        self.status.parse()
    }
}

/// A borrow request joined with the item and borrower names, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BorrowRequestDetail {
    pub id: DbId,
    pub borrower_id: DbId,
    pub borrower_name: String,
    pub item_id: DbId,
    pub item_name: String,
    pub quantity: i32,
    pub borrow_date: Timestamp,
    pub return_date: Timestamp,
    pub purpose: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Request body for `POST /borrow-requests`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBorrowRequest {
    pub item_id: DbId,
    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
    pub borrow_date: Timestamp,
    pub return_date: Timestamp,
    #[validate(length(min = 1, max = 1000))]
    pub purpose: String,
}

/// Listing filter for borrow requests.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<String>,
    pub borrower_id: Option<DbId>,
    pub item_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `PUT /officer/update-request-status/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRequestStatus {
    #[validate(length(min = 1))]
    pub status: String,
    pub rejection_reason: Option<String>,
}

/// Everything an approval touched, returned in one piece.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub request: BorrowRequest,
    pub transaction: Transaction,
    pub item: Item,
}
