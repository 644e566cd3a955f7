//! Transaction (loan record) model and DTOs.

use sborrowhub_core::error::CoreError;
use sborrowhub_core::lifecycle::LoanState;
use sborrowhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::item::Item;

/// A row from the `transactions` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: DbId,
    pub borrower_id: DbId,
    pub item_id: DbId,
    pub borrow_request_id: DbId,
    pub quantity_borrowed: i32,
    pub borrow_date: Timestamp,
    pub return_date: Timestamp,
    pub actual_return_date: Option<Timestamp>,
    pub days_overdue: i32,
    /// In minor currency units.
    pub penalty_amount: i64,
    pub status: String,
    pub processed_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Transaction {
    /// Typed lifecycle state of this loan.
    pub fn loan_state(&self) -> Result<LoanState, CoreError> {
        LoanState::from_record(self.status.parse()?, self.actual_return_date)
    }
}

/// A transaction joined with the item and borrower names, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionDetail {
    pub id: DbId,
    pub borrower_id: DbId,
    pub borrower_name: String,
    pub item_id: DbId,
    pub item_name: String,
    pub borrow_request_id: DbId,
    pub quantity_borrowed: i32,
    pub borrow_date: Timestamp,
    pub return_date: Timestamp,
    pub actual_return_date: Option<Timestamp>,
    pub days_overdue: i32,
    pub penalty_amount: i64,
    pub status: String,
    pub created_at: Timestamp,
}

/// Listing filter for transactions.
///
/// `open_only` keeps loans whose items have not come back yet.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub status: Option<String>,
    pub borrower_id: Option<DbId>,
    pub open_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /officer/transactions/{id}/return`.
///
/// `actual_return_date` defaults to now.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnItems {
    pub actual_return_date: Option<Timestamp>,
}

/// Everything a return touched.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnResult {
    pub transaction: Transaction,
    pub item: Item,
}
