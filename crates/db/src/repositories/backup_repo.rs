//! Export and restore of the lending tables as a [`Snapshot`].

use chrono::Utc;
use sborrowhub_core::backup::SNAPSHOT_FORMAT_VERSION;
use sborrowhub_core::error::CoreError;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::backup::{Snapshot, SnapshotCounts};
use crate::models::borrow_request::BorrowRequest;
use crate::models::contact_message::ContactMessage;
use crate::models::item::Item;
use crate::models::notification::Notification;
use crate::models::review::Review;
use crate::models::transaction::Transaction;
use crate::repositories::{
    contact_message_repo, item_repo, notification_repo, review_repo, transaction_repo,
};

const REQUEST_COLUMNS: &str = "id, borrower_id, item_id, quantity, borrow_date, return_date, \
                               purpose, status, rejection_reason, decided_by, decided_at, \
                               created_at, updated_at";

/// Tables in a snapshot, parents first. Restores delete in reverse order.
const SNAPSHOT_TABLES: &[&str] = &[
    "items",
    "borrow_requests",
    "transactions",
    "reviews",
    "contact_messages",
    "notifications",
];

/// Reads and replaces lending data in bulk.
pub struct BackupRepo;

impl BackupRepo {
    /// Read every snapshot table inside one repeatable-read transaction so
    /// the export is consistent.
    pub async fn export(pool: &PgPool) -> Result<Snapshot, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items ORDER BY id",
            item_repo::COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await?;
        let borrow_requests = sqlx::query_as::<_, BorrowRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM borrow_requests ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?;
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {} FROM transactions ORDER BY id",
            transaction_repo::COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await?;
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews ORDER BY id",
            review_repo::COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await?;
        let contact_messages = sqlx::query_as::<_, ContactMessage>(&format!(
            "SELECT {} FROM contact_messages ORDER BY id",
            contact_message_repo::COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await?;
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications ORDER BY id",
            notification_repo::COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Snapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            created_at: Utc::now(),
            items,
            borrow_requests,
            transactions,
            reviews,
            contact_messages,
            notifications,
        })
    }

    /// Replace all lending data with the snapshot's rows.
    ///
    /// Runs in one database transaction: existing rows are deleted, the
    /// snapshot rows are inserted with their original ids, and each id
    /// sequence is moved past the highest restored id. Any failure (an
    /// unknown user id, a row breaking a constraint) leaves the current
    /// data untouched.
    pub async fn restore(pool: &PgPool, snapshot: &Snapshot) -> Result<SnapshotCounts, RepoError> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(CoreError::Validation(format!(
                "Unsupported snapshot format version {} (expected {SNAPSHOT_FORMAT_VERSION})",
                snapshot.format_version
            ))
            .into());
        }

        let mut tx = pool.begin().await?;

        for table in SNAPSHOT_TABLES.iter().rev() {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }

        insert_items(&mut tx, &snapshot.items).await?;
        insert_requests(&mut tx, &snapshot.borrow_requests).await?;
        insert_transactions(&mut tx, &snapshot.transactions).await?;
        insert_reviews(&mut tx, &snapshot.reviews).await?;
        insert_contact_messages(&mut tx, &snapshot.contact_messages).await?;
        insert_notifications(&mut tx, &snapshot.notifications).await?;

        for table in SNAPSHOT_TABLES {
            sqlx::query(&format!(
                "SELECT setval(pg_get_serial_sequence('{table}', 'id'),
                               COALESCE((SELECT MAX(id) FROM {table}), 0) + 1,
                               false)"
            ))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(snapshot.counts())
    }
}

async fn insert_items(conn: &mut PgConnection, rows: &[Item]) -> Result<(), sqlx::Error> {
    for row in rows {
        sqlx::query(
            "INSERT INTO items
                (id, name, category, description, quantity, available, condition, image_url,
                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.category)
        .bind(&row.description)
        .bind(row.quantity)
        .bind(row.available)
        .bind(&row.condition)
        .bind(&row.image_url)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_requests(conn: &mut PgConnection, rows: &[BorrowRequest]) -> Result<(), sqlx::Error> {
    for row in rows {
        sqlx::query(&format!(
            "INSERT INTO borrow_requests ({REQUEST_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(row.id)
        .bind(row.borrower_id)
        .bind(row.item_id)
        .bind(row.quantity)
        .bind(row.borrow_date)
        .bind(row.return_date)
        .bind(&row.purpose)
        .bind(&row.status)
        .bind(&row.rejection_reason)
        .bind(row.decided_by)
        .bind(row.decided_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_transactions(
    conn: &mut PgConnection,
    rows: &[Transaction],
) -> Result<(), sqlx::Error> {
    for row in rows {
        sqlx::query(&format!(
            "INSERT INTO transactions ({})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            transaction_repo::COLUMNS
        ))
        .bind(row.id)
        .bind(row.borrower_id)
        .bind(row.item_id)
        .bind(row.borrow_request_id)
        .bind(row.quantity_borrowed)
        .bind(row.borrow_date)
        .bind(row.return_date)
        .bind(row.actual_return_date)
        .bind(row.days_overdue)
        .bind(row.penalty_amount)
        .bind(&row.status)
        .bind(row.processed_by)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_reviews(conn: &mut PgConnection, rows: &[Review]) -> Result<(), sqlx::Error> {
    for row in rows {
        sqlx::query(&format!(
            "INSERT INTO reviews ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            review_repo::COLUMNS
        ))
        .bind(row.id)
        .bind(row.reviewer_id)
        .bind(row.item_id)
        .bind(row.borrow_request_id)
        .bind(row.rating)
        .bind(&row.comment)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_contact_messages(
    conn: &mut PgConnection,
    rows: &[ContactMessage],
) -> Result<(), sqlx::Error> {
    for row in rows {
        sqlx::query(&format!(
            "INSERT INTO contact_messages ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            contact_message_repo::COLUMNS
        ))
        .bind(row.id)
        .bind(row.user_id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.subject)
        .bind(&row.message)
        .bind(&row.status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_notifications(
    conn: &mut PgConnection,
    rows: &[Notification],
) -> Result<(), sqlx::Error> {
    for row in rows {
        sqlx::query(&format!(
            "INSERT INTO notifications ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            notification_repo::COLUMNS
        ))
        .bind(row.id)
        .bind(row.user_id)
        .bind(&row.kind)
        .bind(&row.title)
        .bind(&row.message)
        .bind(&row.entity_type)
        .bind(row.entity_id)
        .bind(row.is_read)
        .bind(row.read_at)
        .bind(row.created_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
