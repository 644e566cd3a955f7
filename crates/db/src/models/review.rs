//! Item review model and DTOs.

use sborrowhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `reviews` table. Reviews are immutable once written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: DbId,
    pub reviewer_id: DbId,
    pub item_id: DbId,
    pub borrow_request_id: DbId,
    pub rating: i16,
    pub comment: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A review joined with the reviewer's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewDetail {
    pub id: DbId,
    pub reviewer_id: DbId,
    pub reviewer_name: String,
    pub item_id: DbId,
    pub item_name: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: Timestamp,
}

/// Request body for `POST /reviews`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReview {
    pub borrow_request_id: DbId,
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Aggregate rating for an item.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RatingSummary {
    pub review_count: i64,
    pub average_rating: Option<f64>,
}
