//! Repository for the `transactions` table: loan listings, returns and
//! overdue marking.

use sborrowhub_core::error::CoreError;
use sborrowhub_core::lifecycle::{validate_return_time, TRANSACTION_COMPLETED, TRANSACTION_OVERDUE};
use sborrowhub_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use sborrowhub_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::item::Item;
use crate::models::transaction::{
    ReturnResult, Transaction, TransactionDetail, TransactionFilter,
};
use crate::repositories::item_repo;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, borrower_id, item_id, borrow_request_id, quantity_borrowed, \
                                  borrow_date, return_date, actual_return_date, days_overdue, \
                                  penalty_amount, status, processed_by, created_at, updated_at";

/// Columns for [`TransactionDetail`], selected from `transactions t` joined
/// with `users u` and `items i`.
const DETAIL_COLUMNS: &str = "t.id, t.borrower_id, u.full_name AS borrower_name, t.item_id, \
                              i.name AS item_name, t.borrow_request_id, t.quantity_borrowed, \
                              t.borrow_date, t.return_date, t.actual_return_date, \
                              t.days_overdue, t.penalty_amount, t.status, t.created_at";

/// Provides loan queries and the return workflow.
pub struct TransactionRepo;

impl TransactionRepo {
    /// Find a transaction by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transactions WHERE id = $1");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the transaction opened by a borrow request, if it was approved.
    pub async fn find_by_request(
        pool: &PgPool,
        borrow_request_id: DbId,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transactions WHERE borrow_request_id = $1");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(borrow_request_id)
            .fetch_optional(pool)
            .await
    }

    /// List transactions, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM transactions t
             JOIN users u ON u.id = t.borrower_id
             JOIN items i ON i.id = t.item_id
             WHERE ($1::text IS NULL OR t.status = $1)
               AND ($2::bigint IS NULL OR t.borrower_id = $2)
               AND (NOT $3 OR t.actual_return_date IS NULL)
             ORDER BY t.created_at DESC, t.id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, TransactionDetail>(&query)
            .bind(&filter.status)
            .bind(filter.borrower_id)
            .bind(filter.open_only)
            .bind(clamp_limit(filter.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// List one borrower's transactions, newest first.
    pub async fn list_for_borrower(
        pool: &PgPool,
        borrower_id: DbId,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionDetail>, sqlx::Error> {
        let scoped = TransactionFilter {
            borrower_id: Some(borrower_id),
            ..filter.clone()
        };
        Self::list(pool, &scoped).await
    }

    /// Record the return of a loan.
    ///
    /// The row is locked, the typed state decides the outcome (late returns
    /// carry `days_overdue` and a penalty), and the borrowed units go back on
    /// the shelf. The stock increment is guarded by `available + qty <=
    /// quantity`; if it would break the invariant nothing is written.
    pub async fn process_return(
        pool: &PgPool,
        id: DbId,
        officer_id: DbId,
        returned_at: Timestamp,
        penalty_per_day: i64,
    ) -> Result<ReturnResult, RepoError> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM transactions WHERE id = $1 FOR UPDATE");
        let current = sqlx::query_as::<_, Transaction>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Transaction",
                id,
            })?;

        validate_return_time(current.borrow_date, returned_at)?;
        let outcome =
            current
                .loan_state()?
                .process_return(current.return_date, returned_at, penalty_per_day)?;

        let update = format!(
            "UPDATE transactions SET
                actual_return_date = $2,
                days_overdue = $3,
                penalty_amount = $4,
                status = $5,
                processed_by = $6
             WHERE id = $1 AND actual_return_date IS NULL
             RETURNING {COLUMNS}"
        );
        let transaction = sqlx::query_as::<_, Transaction>(&update)
            .bind(id)
            .bind(returned_at)
            .bind(outcome.days_overdue)
            .bind(outcome.penalty_amount)
            .bind(outcome.status.as_str())
            .bind(officer_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict("Transaction has already been returned".to_string())
            })?;

        let item_query = format!(
            "UPDATE items SET available = available + $2
             WHERE id = $1 AND available + $2 <= quantity
             RETURNING {}",
            item_repo::COLUMNS
        );
        let item = sqlx::query_as::<_, Item>(&item_query)
            .bind(transaction.item_id)
            .bind(transaction.quantity_borrowed)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict(format!(
                    "Returning {} unit(s) would exceed the item's total quantity",
                    transaction.quantity_borrowed
                ))
            })?;

        tx.commit().await?;
        Ok(ReturnResult { transaction, item })
    }

    /// Flag every unreturned loan whose return date is before `now` as
    /// overdue. Returns the rows that changed.
    pub async fn mark_overdue(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "UPDATE transactions SET status = '{TRANSACTION_OVERDUE}'
             WHERE status = '{TRANSACTION_COMPLETED}'
               AND actual_return_date IS NULL
               AND return_date < $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }
}
