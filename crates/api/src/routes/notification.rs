//! Route definitions for the `/notifications` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET   /              -> list_notifications (?unread_only, limit, offset)
/// GET   /unread-count  -> unread_count
/// POST  /read-all      -> mark_all_read
/// PATCH /{id}/read     -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/unread-count", get(notification::unread_count))
        .route("/read-all", post(notification::mark_all_read))
        .route("/{id}/read", patch(notification::mark_read))
}
