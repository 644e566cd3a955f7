pub mod admin;
pub mod auth;
pub mod borrower;
pub mod catalog;
pub mod health;
pub mod notification;
pub mod officer;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register, /auth/login, /auth/refresh     public
/// /auth/logout                                   requires auth
///
/// /catalog/get-items                             list items (public)
/// /catalog/add-item                              add item (officer)
/// /catalog/categories                            categories with counts (public)
/// /catalog/items/{id}                            get (public), update, delete (officer)
/// /catalog/items/{id}/reviews                    reviews of an item (public)
///
/// /borrow-requests                               submit, list own
/// /borrow-requests/{id}                          get
/// /transactions                                  own loans
/// /reviews                                       review a returned loan
/// /contact                                       contact form (auth optional)
/// /user/dashboard                                borrower counters
/// /user/settings                                 get, update preferences
///
/// /notifications                                 list (?unread_only, limit, offset)
/// /notifications/unread-count                    unread count
/// /notifications/read-all                        mark all read (POST)
/// /notifications/{id}/read                       mark read (PATCH)
///
/// /officer/get-all-requests                      all requests
/// /officer/update-request-status/{id}            approve / reject (PUT)
/// /officer/get-all-transactions                  all loans
/// /officer/transactions/{id}/return              mark returned (POST)
/// /officer/refresh-overdue                       run overdue sweep (POST)
/// /officer/dashboard                             officer counters
///
/// /admin/users, /admin/users/{id}                user management
/// /admin/users/{id}/role                         change role (PUT)
/// /admin/users/{id}/reset-password               reset password (POST)
/// /admin/roles                                   list roles
/// /admin/feedback                                contact messages and reviews
/// /admin/feedback/contact/{id}                   update message status (PUT)
/// /admin/dashboard                               admin counters
/// /admin/backups, /admin/backups/{name}          create, list, get, delete
/// /admin/backups/{name}/restore                  restore (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/catalog", catalog::router())
        .merge(borrower::router())
        .nest("/notifications", notification::router())
        .nest("/officer", officer::router())
        .nest("/admin", admin::router())
}
