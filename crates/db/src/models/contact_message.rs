//! Contact message model and DTOs.

use sborrowhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `contact_messages` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /contact`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContactMessage {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// Request body for `PUT /admin/feedback/contact/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContactStatus {
    #[validate(length(min = 1))]
    pub status: String,
}
