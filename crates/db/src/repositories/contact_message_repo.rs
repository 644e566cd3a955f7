//! Repository for the `contact_messages` table.

use sborrowhub_core::search::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use sborrowhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::contact_message::{ContactMessage, CreateContactMessage};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str =
    "id, user_id, name, email, subject, message, status, created_at, updated_at";

/// Provides operations for contact messages.
pub struct ContactMessageRepo;

impl ContactMessageRepo {
    /// Store a message from the contact form. `user_id` is set when the
    /// sender was signed in.
    pub async fn create(
        pool: &PgPool,
        user_id: Option<DbId>,
        input: &CreateContactMessage,
    ) -> Result<ContactMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO contact_messages (user_id, name, email, subject, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(user_id)
            .bind(input.name.trim())
            .bind(input.email.trim())
            .bind(input.subject.trim())
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// List messages newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ContactMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contact_messages
             WHERE ($1::text IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(status)
            .bind(clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Set a message's status. Returns `None` if the message does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<ContactMessage>, sqlx::Error> {
        let query = format!(
            "UPDATE contact_messages SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
