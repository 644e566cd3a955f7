//! Aggregate queries behind the officer, admin and borrower dashboards.

use sborrowhub_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::dashboard::{
    AdminSummary, BorrowerSummary, CategoryUsage, OfficerSummary, PopularItem,
};

/// Read-only dashboard counters. Every query is a single round trip.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Counters for the officer's work queue. `now` decides which returns
    /// are due today (UTC day).
    pub async fn officer_summary(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<OfficerSummary, sqlx::Error> {
        sqlx::query_as::<_, OfficerSummary>(
            "SELECT
                (SELECT COUNT(*) FROM borrow_requests WHERE status = 'pending') AS pending_requests,
                (SELECT COUNT(*) FROM transactions WHERE actual_return_date IS NULL) AS active_loans,
                (SELECT COUNT(*) FROM transactions
                    WHERE actual_return_date IS NULL AND status = 'overdue') AS overdue_loans,
                (SELECT COUNT(*) FROM items) AS items_total,
                (SELECT COUNT(*) FROM items WHERE available = 0) AS items_out_of_stock,
                (SELECT COUNT(*) FROM transactions
                    WHERE actual_return_date IS NULL
                      AND (return_date AT TIME ZONE 'UTC')::date
                          = ($1::timestamptz AT TIME ZONE 'UTC')::date
                ) AS returns_due_today",
        )
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// System-wide counters for administrators.
    pub async fn admin_summary(pool: &PgPool) -> Result<AdminSummary, sqlx::Error> {
        sqlx::query_as::<_, AdminSummary>(
            "SELECT
                (SELECT COUNT(*) FROM users) AS users_total,
                (SELECT COUNT(*) FROM users WHERE is_active) AS users_active,
                (SELECT COUNT(*) FROM items) AS items_total,
                (SELECT COALESCE(SUM(quantity), 0)::bigint FROM items) AS units_total,
                (SELECT COALESCE(SUM(quantity - available), 0)::bigint FROM items) AS units_lent,
                (SELECT COUNT(*) FROM borrow_requests) AS requests_total,
                (SELECT COUNT(*) FROM borrow_requests WHERE status = 'pending') AS requests_pending,
                (SELECT COUNT(*) FROM transactions) AS transactions_total,
                (SELECT COUNT(*) FROM transactions WHERE status = 'returned_late') AS transactions_late,
                (SELECT COALESCE(SUM(penalty_amount), 0)::bigint FROM transactions) AS penalties_total,
                (SELECT COUNT(*) FROM contact_messages WHERE status = 'unread') AS unread_contact_messages,
                (SELECT AVG(rating)::float8 FROM reviews) AS average_rating",
        )
        .fetch_one(pool)
        .await
    }

    /// Counters for one borrower's own activity.
    pub async fn borrower_summary(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<BorrowerSummary, sqlx::Error> {
        sqlx::query_as::<_, BorrowerSummary>(
            "SELECT
                (SELECT COUNT(*) FROM borrow_requests
                    WHERE borrower_id = $1 AND status = 'pending') AS pending_requests,
                (SELECT COUNT(*) FROM transactions
                    WHERE borrower_id = $1 AND actual_return_date IS NULL) AS active_loans,
                (SELECT COUNT(*) FROM transactions
                    WHERE borrower_id = $1 AND actual_return_date IS NULL
                      AND status = 'overdue') AS overdue_loans,
                (SELECT COUNT(*) FROM transactions WHERE borrower_id = $1) AS loans_total,
                (SELECT COALESCE(SUM(penalty_amount), 0)::bigint FROM transactions
                    WHERE borrower_id = $1) AS penalties_total,
                (SELECT COUNT(*) FROM notifications
                    WHERE user_id = $1 AND is_read = false) AS unread_notifications",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Loans and borrowed units per category, busiest first.
    pub async fn category_usage(pool: &PgPool) -> Result<Vec<CategoryUsage>, sqlx::Error> {
        sqlx::query_as::<_, CategoryUsage>(
            "SELECT i.category,
                    COUNT(DISTINCT i.id) AS item_count,
                    COUNT(t.id) AS loans,
                    COALESCE(SUM(t.quantity_borrowed), 0)::bigint AS units_borrowed
             FROM items i
             LEFT JOIN transactions t ON t.item_id = i.id
             GROUP BY i.category
             ORDER BY loans DESC, i.category ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// The most borrowed items.
    pub async fn popular_items(pool: &PgPool, limit: i64) -> Result<Vec<PopularItem>, sqlx::Error> {
        sqlx::query_as::<_, PopularItem>(
            "SELECT i.id AS item_id, i.name, COUNT(t.id) AS loans
             FROM items i
             JOIN transactions t ON t.item_id = i.id
             GROUP BY i.id, i.name
             ORDER BY loans DESC, i.name ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
