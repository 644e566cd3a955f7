//! Catalog item model and DTOs.

use sborrowhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `items` table.
///
/// `available` is the number of units on the shelf; `quantity - available`
/// units are currently lent out.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Item {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub available: i32,
    pub condition: String,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding an item to the catalog. All units start on the shelf.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItem {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 100000))]
    pub quantity: i32,
    /// Defaults to `good`.
    pub condition: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
}

/// DTO for editing an item. Changing `quantity` keeps lent units lent.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateItem {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 100000))]
    pub quantity: Option<i32>,
    pub condition: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub available_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A category with its item count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub item_count: i64,
}
