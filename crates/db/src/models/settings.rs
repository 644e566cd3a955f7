//! Persisted user preferences.

use sborrowhub_core::settings::UserPreferences;
use sborrowhub_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `user_settings` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSettings {
    pub id: DbId,
    pub user_id: DbId,
    pub theme: String,
    pub language: String,
    pub email_notifications: bool,
    pub items_per_page: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UserSettings> for UserPreferences {
    fn from(row: UserSettings) -> Self {
        Self {
            theme: row.theme,
            language: row.language,
            email_notifications: row.email_notifications,
            items_per_page: row.items_per_page,
        }
    }
}
