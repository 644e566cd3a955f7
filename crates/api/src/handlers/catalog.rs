//! Handlers for the `/catalog` resource.
//!
//! Browsing is open to anyone; adding, editing and removing items requires
//! [`RequireOfficer`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use sborrowhub_core::error::CoreError;
use sborrowhub_core::types::DbId;
use sborrowhub_db::models::item::{CategoryCount, CreateItem, Item, ItemFilter, UpdateItem};
use sborrowhub_db::models::review::{RatingSummary, ReviewDetail};
use sborrowhub_db::repositories::{ItemRepo, ReviewRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireOfficer;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// Query parameters for `GET /catalog/get-items`.
#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    pub category: Option<String>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    /// Only items with at least one unit on the shelf.
    #[serde(default)]
    pub available_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// An item with its review aggregate.
#[derive(Debug, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub rating: RatingSummary,
}

fn item_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Item", id })
}

/// GET /api/v1/catalog/get-items
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ItemQuery>,
) -> AppResult<Json<DataResponse<Vec<Item>>>> {
    let filter = ItemFilter {
        category: params
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        search: params.search,
        available_only: params.available_only,
        limit: params.limit,
        offset: params.offset,
    };
    let items = ItemRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/catalog/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CategoryCount>>>> {
    let categories = ItemRepo::categories(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/catalog/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ItemDetail>>> {
    let item = ItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    let rating = ReviewRepo::rating_summary(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ItemDetail { item, rating },
    }))
}

/// GET /api/v1/catalog/items/{id}/reviews
pub async fn list_item_reviews(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ReviewDetail>>>> {
    if ItemRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(item_not_found(id));
    }
    let reviews = ReviewRepo::list_for_item(&state.pool, id, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// POST /api/v1/catalog/add-item
pub async fn add_item(
    State(state): State<AppState>,
    RequireOfficer(officer): RequireOfficer,
    ValidatedJson(input): ValidatedJson<CreateItem>,
) -> AppResult<(StatusCode, Json<DataResponse<Item>>)> {
    let item = ItemRepo::create(&state.pool, &input).await?;
    tracing::info!(
        item_id = item.id,
        quantity = item.quantity,
        officer_id = officer.user_id,
        "Item added to catalog"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /api/v1/catalog/items/{id}
///
/// A new `quantity` keeps lent units lent; it may not drop below them.
pub async fn update_item(
    State(state): State<AppState>,
    RequireOfficer(officer): RequireOfficer,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateItem>,
) -> AppResult<Json<DataResponse<Item>>> {
    let item = ItemRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    tracing::info!(item_id = id, officer_id = officer.user_id, "Item updated");
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/catalog/items/{id}
///
/// Refused with 409 while units are out on loan or history references it.
pub async fn delete_item(
    State(state): State<AppState>,
    RequireOfficer(officer): RequireOfficer,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ItemRepo::delete(&state.pool, id).await? {
        return Err(item_not_found(id));
    }
    tracing::info!(item_id = id, officer_id = officer.user_id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}
