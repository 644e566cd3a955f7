//! Repository for the `user_settings` table.

use sborrowhub_core::settings::UserPreferences;
use sborrowhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::settings::UserSettings;

const COLUMNS: &str = "id, user_id, theme, language, email_notifications, items_per_page, \
                       created_at, updated_at";

/// Stores per-user preferences. Users without a row get the defaults.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Load a user's preferences, falling back to the defaults when none
    /// were saved yet.
    pub async fn get_or_default(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<UserPreferences, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_settings WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(UserPreferences::from).unwrap_or_default())
    }

    /// Insert or replace a user's preferences.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        prefs: &UserPreferences,
    ) -> Result<UserPreferences, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_settings (user_id, theme, language, email_notifications, items_per_page)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_user_settings_user_id DO UPDATE SET
                theme = EXCLUDED.theme,
                language = EXCLUDED.language,
                email_notifications = EXCLUDED.email_notifications,
                items_per_page = EXCLUDED.items_per_page
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .bind(&prefs.theme)
            .bind(&prefs.language)
            .bind(prefs.email_notifications)
            .bind(prefs.items_per_page)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }
}
