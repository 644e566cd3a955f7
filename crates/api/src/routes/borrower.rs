//! Routes for signed-in borrowers: requests, loans, reviews, contact,
//! dashboard and settings.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{borrow_request, contact, dashboard, review, settings};
use crate::state::AppState;

/// Mounted at the `/api/v1` root.
///
/// ```text
/// POST /borrow-requests        -> create_request
/// GET  /borrow-requests        -> list_my_requests (?status, limit, offset)
/// GET  /borrow-requests/{id}   -> get_request
/// GET  /transactions           -> list_my_transactions (?status, open_only, limit, offset)
/// POST /reviews                -> create_review
/// POST /contact                -> submit_contact (auth optional)
/// GET  /user/dashboard         -> borrower_dashboard
/// GET  /user/settings          -> get_settings
/// PUT  /user/settings          -> update_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/borrow-requests",
            post(borrow_request::create_request).get(borrow_request::list_my_requests),
        )
        .route("/borrow-requests/{id}", get(borrow_request::get_request))
        .route("/transactions", get(borrow_request::list_my_transactions))
        .route("/reviews", post(review::create_review))
        .route("/contact", post(contact::submit_contact))
        .route("/user/dashboard", get(dashboard::borrower_dashboard))
        .route(
            "/user/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
}
