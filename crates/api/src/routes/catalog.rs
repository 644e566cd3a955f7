//! Route definitions for the `/catalog` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Routes mounted at `/catalog`.
///
/// Reads are public; writes require the officer role.
///
/// ```text
/// GET    /get-items           -> list_items (?category, search, available_only, limit, offset)
/// POST   /add-item            -> add_item
/// GET    /categories          -> list_categories
/// GET    /items/{id}          -> get_item
/// PUT    /items/{id}          -> update_item
/// DELETE /items/{id}          -> delete_item
/// GET    /items/{id}/reviews  -> list_item_reviews
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-items", get(catalog::list_items))
        .route("/add-item", post(catalog::add_item))
        .route("/categories", get(catalog::list_categories))
        .route(
            "/items/{id}",
            get(catalog::get_item)
                .put(catalog::update_item)
                .delete(catalog::delete_item),
        )
        .route("/items/{id}/reviews", get(catalog::list_item_reviews))
}
