//! Aggregate counters for the officer, admin and borrower dashboards.

use sborrowhub_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Officer dashboard counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OfficerSummary {
    pub pending_requests: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub items_total: i64,
    pub items_out_of_stock: i64,
    pub returns_due_today: i64,
}

/// Admin dashboard counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminSummary {
    pub users_total: i64,
    pub users_active: i64,
    pub items_total: i64,
    pub units_total: i64,
    pub units_lent: i64,
    pub requests_total: i64,
    pub requests_pending: i64,
    pub transactions_total: i64,
    pub transactions_late: i64,
    pub penalties_total: i64,
    pub unread_contact_messages: i64,
    pub average_rating: Option<f64>,
}

/// Borrower dashboard counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BorrowerSummary {
    pub pending_requests: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub loans_total: i64,
    pub penalties_total: i64,
    pub unread_notifications: i64,
}

/// How often items in a category were borrowed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryUsage {
    pub category: String,
    pub item_count: i64,
    pub loans: i64,
    pub units_borrowed: i64,
}

/// Most borrowed items.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PopularItem {
    pub item_id: DbId,
    pub name: String,
    pub loans: i64,
}
