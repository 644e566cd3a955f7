//! Repository for the `reviews` table.

use sborrowhub_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use sborrowhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{RatingSummary, Review, ReviewDetail};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, reviewer_id, item_id, borrow_request_id, rating, comment, created_at, updated_at";

const DETAIL_COLUMNS: &str = "rv.id, rv.reviewer_id, u.full_name AS reviewer_name, rv.item_id, \
                              i.name AS item_name, rv.rating, rv.comment, rv.created_at";

/// Provides create and read operations for reviews. Reviews are never edited.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review. A second review of the same borrow request violates
    /// `uq_reviews_borrow_request_id`.
    pub async fn create(
        pool: &PgPool,
        reviewer_id: DbId,
        item_id: DbId,
        borrow_request_id: DbId,
        rating: i16,
        comment: &str,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (reviewer_id, item_id, borrow_request_id, rating, comment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(reviewer_id)
            .bind(item_id)
            .bind(borrow_request_id)
            .bind(rating)
            .bind(comment)
            .fetch_one(pool)
            .await
    }

    /// Reviews of one item, newest first.
    pub async fn list_for_item(
        pool: &PgPool,
        item_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ReviewDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM reviews rv
             JOIN users u ON u.id = rv.reviewer_id
             JOIN items i ON i.id = rv.item_id
             WHERE rv.item_id = $1
             ORDER BY rv.created_at DESC, rv.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ReviewDetail>(&query)
            .bind(item_id)
            .bind(clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// All reviews, newest first, for the admin feedback view.
    pub async fn list_all(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ReviewDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM reviews rv
             JOIN users u ON u.id = rv.reviewer_id
             JOIN items i ON i.id = rv.item_id
             ORDER BY rv.created_at DESC, rv.id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ReviewDetail>(&query)
            .bind(clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Review count and average rating for an item. The average is `None`
    /// when the item has no reviews.
    pub async fn rating_summary(pool: &PgPool, item_id: DbId) -> Result<RatingSummary, sqlx::Error> {
        sqlx::query_as::<_, RatingSummary>(
            "SELECT COUNT(*) AS review_count, AVG(rating)::float8 AS average_rating
             FROM reviews WHERE item_id = $1",
        )
        .bind(item_id)
        .fetch_one(pool)
        .await
    }
}
