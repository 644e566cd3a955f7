//! Repository for the `items` table.

use sborrowhub_core::error::CoreError;
use sborrowhub_core::inventory::{self, CONDITION_GOOD};
use sborrowhub_core::search::{
    clamp_limit, clamp_offset, like_pattern, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use sborrowhub_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::item::{CategoryCount, CreateItem, Item, ItemFilter, UpdateItem};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, name, category, description, quantity, available, \
                                  condition, image_url, created_at, updated_at";

/// Provides CRUD operations for catalog items.
///
/// `available` is only ever changed by this repository through guarded
/// updates; lending and returns go through
/// [`BorrowRequestRepo`](super::BorrowRequestRepo) and
/// [`TransactionRepo`](super::TransactionRepo).
pub struct ItemRepo;

impl ItemRepo {
    /// Insert a new item with every unit on the shelf.
    pub async fn create(pool: &PgPool, input: &CreateItem) -> Result<Item, RepoError> {
        let condition = input.condition.as_deref().unwrap_or(CONDITION_GOOD);
        inventory::validate_condition(condition)?;
        inventory::validate_counts(input.quantity, input.quantity)?;

        let query = format!(
            "INSERT INTO items (name, category, description, quantity, available, condition, image_url)
             VALUES ($1, $2, $3, $4, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, Item>(&query)
            .bind(input.name.trim())
            .bind(input.category.trim())
            .bind(&input.description)
            .bind(input.quantity)
            .bind(condition)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await?;
        Ok(item)
    }

    /// Find an item by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List catalog items ordered by name.
    ///
    /// `search` matches name or description case-insensitively; LIKE
    /// wildcards in the search text are matched literally.
    pub async fn list(pool: &PgPool, filter: &ItemFilter) -> Result<Vec<Item>, sqlx::Error> {
        let pattern = filter.search.as_deref().and_then(like_pattern);
        let query = format!(
            "SELECT {COLUMNS} FROM items
             WHERE ($1::text IS NULL OR category = $1)
               AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)
               AND (NOT $3 OR available > 0)
             ORDER BY name ASC, id ASC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(&filter.category)
            .bind(pattern)
            .bind(filter.available_only)
            .bind(clamp_limit(filter.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// Distinct categories with the number of items in each.
    pub async fn categories(pool: &PgPool) -> Result<Vec<CategoryCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS item_count
             FROM items
             GROUP BY category
             ORDER BY category ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Update an item. Only non-`None` fields in `input` are applied.
    ///
    /// A new `quantity` keeps the units currently lent out lent: `available`
    /// moves by the same amount, and the quantity may not drop below the
    /// lent count. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateItem,
    ) -> Result<Option<Item>, RepoError> {
        if let Some(condition) = input.condition.as_deref() {
            inventory::validate_condition(condition)?;
        }

        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM items WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Item>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let (quantity, available) = match input.quantity {
            Some(new_quantity) => (
                new_quantity,
                inventory::rebalance(current.quantity, current.available, new_quantity)?,
            ),
            None => (current.quantity, current.available),
        };

        let query = format!(
            "UPDATE items SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                description = COALESCE($4, description),
                quantity = $5,
                available = $6,
                condition = COALESCE($7, condition),
                image_url = COALESCE($8, image_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.category.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(quantity)
            .bind(available)
            .bind(&input.condition)
            .bind(&input.image_url)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(item))
    }

    /// Delete an item.
    ///
    /// Refused with a conflict while any of its loans is unreturned. Items
    /// with borrowing history are protected by foreign keys as well.
    /// Returns `false` if no row with the given `id` exists.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, RepoError> {
        let mut tx = pool.begin().await?;

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions
             WHERE item_id = $1 AND actual_return_date IS NULL",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if open_loans > 0 {
            return Err(CoreError::Conflict(format!(
                "Item has {open_loans} unreturned loan(s) and cannot be deleted"
            ))
            .into());
        }

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
