//! Per-user preferences.
//!
//! Preferences are an explicit value loaded when a session starts (returned
//! alongside the login tokens) and changed only through the settings
//! endpoints, instead of living in ambient client-side storage.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const THEME_LIGHT: &str = "light";
pub const THEME_DARK: &str = "dark";
pub const THEME_SYSTEM: &str = "system";

/// All accepted theme values.
pub const VALID_THEMES: &[&str] = &[THEME_LIGHT, THEME_DARK, THEME_SYSTEM];

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_ITEMS_PER_PAGE: i32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserPreferences {
    #[validate(custom(function = "validate_theme"))]
    pub theme: String,
    #[validate(length(min = 2, max = 5))]
    pub language: String,
    pub email_notifications: bool,
    #[validate(range(min = 1, max = 100))]
    pub items_per_page: i32,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: THEME_LIGHT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            email_notifications: true,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesPatch {
    pub theme: Option<String>,
    pub language: Option<String>,
    pub email_notifications: Option<bool>,
    pub items_per_page: Option<i32>,
}

impl UserPreferences {
    /// Apply a patch, returning the merged preferences. The result still has
    /// to be validated by the caller.
    pub fn merged(&self, patch: PreferencesPatch) -> Self {
        Self {
            theme: patch.theme.unwrap_or_else(|| self.theme.clone()),
            language: patch.language.unwrap_or_else(|| self.language.clone()),
            email_notifications: patch
                .email_notifications
                .unwrap_or(self.email_notifications),
            items_per_page: patch.items_per_page.unwrap_or(self.items_per_page),
        }
    }
}

fn validate_theme(theme: &str) -> Result<(), ValidationError> {
    if VALID_THEMES.contains(&theme) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_theme"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(UserPreferences::default().validate().is_ok());
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let base = UserPreferences::default();
        let merged = base.merged(PreferencesPatch {
            theme: Some(THEME_DARK.to_string()),
            ..Default::default()
        });
        assert_eq!(merged.theme, THEME_DARK);
        assert_eq!(merged.language, base.language);
        assert_eq!(merged.items_per_page, base.items_per_page);
    }

    #[test]
    fn unknown_theme_fails_validation() {
        let prefs = UserPreferences {
            theme: "neon".to_string(),
            ..Default::default()
        };
        let errors = prefs.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("theme"));
    }

    #[test]
    fn page_size_is_bounded() {
        let prefs = UserPreferences {
            items_per_page: 0,
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
    }
}
