//! Repository for the `borrow_requests` table and the approval workflow.

use sborrowhub_core::error::CoreError;
use sborrowhub_core::lifecycle::{normalize_reason, RequestStatus, REQUEST_PENDING};
use sborrowhub_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use sborrowhub_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::borrow_request::{
    ApprovalOutcome, BorrowRequest, BorrowRequestDetail, CreateBorrowRequest, RequestFilter,
};
use crate::models::item::Item;
use crate::models::transaction::Transaction;
use crate::repositories::{item_repo, transaction_repo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, borrower_id, item_id, quantity, borrow_date, return_date, purpose, \
                       status, rejection_reason, decided_by, decided_at, created_at, updated_at";

/// Columns for [`BorrowRequestDetail`], selected from `borrow_requests r`
/// joined with `users u` and `items i`.
const DETAIL_COLUMNS: &str = "r.id, r.borrower_id, u.full_name AS borrower_name, r.item_id, \
                              i.name AS item_name, r.quantity, r.borrow_date, r.return_date, \
                              r.purpose, r.status, r.rejection_reason, r.decided_by, \
                              r.decided_at, r.created_at";

/// Provides CRUD operations and officer decisions for borrow requests.
pub struct BorrowRequestRepo;

impl BorrowRequestRepo {
    /// Insert a new pending request, returning the created row.
    pub async fn create(
        pool: &PgPool,
        borrower_id: DbId,
        input: &CreateBorrowRequest,
    ) -> Result<BorrowRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO borrow_requests
                (borrower_id, item_id, quantity, borrow_date, return_date, purpose)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BorrowRequest>(&query)
            .bind(borrower_id)
            .bind(input.item_id)
            .bind(input.quantity)
            .bind(input.borrow_date)
            .bind(input.return_date)
            .bind(input.purpose.trim())
            .fetch_one(pool)
            .await
    }

    /// Find a request by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BorrowRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM borrow_requests WHERE id = $1");
        sqlx::query_as::<_, BorrowRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a request with borrower and item names.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BorrowRequestDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM borrow_requests r
             JOIN users u ON u.id = r.borrower_id
             JOIN items i ON i.id = r.item_id
             WHERE r.id = $1"
        );
        sqlx::query_as::<_, BorrowRequestDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List requests, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &RequestFilter,
    ) -> Result<Vec<BorrowRequestDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM borrow_requests r
             JOIN users u ON u.id = r.borrower_id
             JOIN items i ON i.id = r.item_id
             WHERE ($1::text IS NULL OR r.status = $1)
               AND ($2::bigint IS NULL OR r.borrower_id = $2)
               AND ($3::bigint IS NULL OR r.item_id = $3)
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, BorrowRequestDetail>(&query)
            .bind(&filter.status)
            .bind(filter.borrower_id)
            .bind(filter.item_id)
            .bind(clamp_limit(filter.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// List one borrower's requests, newest first.
    pub async fn list_for_borrower(
        pool: &PgPool,
        borrower_id: DbId,
        filter: &RequestFilter,
    ) -> Result<Vec<BorrowRequestDetail>, sqlx::Error> {
        let scoped = RequestFilter {
            borrower_id: Some(borrower_id),
            ..filter.clone()
        };
        Self::list(pool, &scoped).await
    }

    /// Approve a pending request.
    ///
    /// In one database transaction: the request moves to `approved` only if
    /// it is still pending, the item's stock is decremented only if enough
    /// units are on the shelf, and the loan record is opened. If either
    /// guard fails nothing is written and the failure is reported as a
    /// conflict (or not-found for a missing request).
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        officer_id: DbId,
    ) -> Result<ApprovalOutcome, RepoError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE borrow_requests SET
                status = 'approved',
                decided_by = $2,
                decided_at = NOW()
             WHERE id = $1 AND status = '{REQUEST_PENDING}'
             RETURNING {COLUMNS}"
        );
        let Some(request) = sqlx::query_as::<_, BorrowRequest>(&query)
            .bind(id)
            .bind(officer_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Err(explain_unresolvable(&mut tx, id, |s| s.approve()).await);
        };

        let item_query = format!(
            "UPDATE items SET available = available - $2
             WHERE id = $1 AND available >= $2
             RETURNING {}",
            item_repo::COLUMNS
        );
        let Some(item) = sqlx::query_as::<_, Item>(&item_query)
            .bind(request.item_id)
            .bind(request.quantity)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Err(explain_short_stock(&mut tx, request.item_id, request.quantity).await);
        };

        let txn_query = format!(
            "INSERT INTO transactions
                (borrower_id, item_id, borrow_request_id, quantity_borrowed,
                 borrow_date, return_date, status, processed_by)
             VALUES ($1, $2, $3, $4, $5, $6, 'completed', $7)
             RETURNING {}",
            transaction_repo::COLUMNS
        );
        let transaction = sqlx::query_as::<_, Transaction>(&txn_query)
            .bind(request.borrower_id)
            .bind(request.item_id)
            .bind(request.id)
            .bind(request.quantity)
            .bind(request.borrow_date)
            .bind(request.return_date)
            .bind(officer_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ApprovalOutcome {
            request,
            transaction,
            item,
        })
    }

    /// Reject a pending request with a reason. Stock is not touched.
    ///
    /// The reason is checked before anything is written.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        officer_id: DbId,
        reason: &str,
    ) -> Result<BorrowRequest, RepoError> {
        let reason = normalize_reason(Some(reason))?;

        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE borrow_requests SET
                status = 'rejected',
                rejection_reason = $3,
                decided_by = $2,
                decided_at = NOW()
             WHERE id = $1 AND status = '{REQUEST_PENDING}'
             RETURNING {COLUMNS}"
        );
        let Some(request) = sqlx::query_as::<_, BorrowRequest>(&query)
            .bind(id)
            .bind(officer_id)
            .bind(&reason)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Err(explain_unresolvable(&mut tx, id, |s| s.reject(&reason)).await);
        };

        tx.commit().await?;
        Ok(request)
    }

    /// Whether the borrower has a request for this item that is still pending.
    pub async fn has_pending(
        pool: &PgPool,
        borrower_id: DbId,
        item_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM borrow_requests
                WHERE borrower_id = $1 AND item_id = $2 AND status = 'pending'
             )",
        )
        .bind(borrower_id)
        .bind(item_id)
        .fetch_one(pool)
        .await
    }
}

/// Work out why a guarded status update matched no row: the request is
/// missing, or the typed transition from its current state is refused.
async fn explain_unresolvable<F>(conn: &mut PgConnection, id: DbId, transition: F) -> RepoError
where
    F: FnOnce(RequestStatus) -> Result<RequestStatus, CoreError>,
{
    let status: Option<String> =
        match sqlx::query_scalar("SELECT status FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
        {
            Ok(status) => status,
            Err(e) => return e.into(),
        };

    let Some(status) = status else {
        return CoreError::NotFound {
            entity: "BorrowRequest",
            id,
        }
        .into();
    };

    match status.parse::<RequestStatus>().and_then(transition) {
        Err(e) => e.into(),
        // The row changed between the guarded update and this read.
        Ok(_) => CoreError::Conflict(format!(
            "Borrow request {id} was modified concurrently; retry the decision"
        ))
        .into(),
    }
}

/// Build the conflict reported when the conditional stock decrement fails.
async fn explain_short_stock(conn: &mut PgConnection, item_id: DbId, requested: i32) -> RepoError {
    let available: Option<(String, i32)> =
        match sqlx::query_as("SELECT name, available FROM items WHERE id = $1")
            .bind(item_id)
            .fetch_optional(conn)
            .await
        {
            Ok(row) => row,
            Err(e) => return e.into(),
        };

    match available {
        Some((name, available)) => CoreError::Conflict(format!(
            "Insufficient stock for '{name}': requested {requested}, available {available}"
        ))
        .into(),
        None => CoreError::NotFound {
            entity: "Item",
            id: item_id,
        }
        .into(),
    }
}
