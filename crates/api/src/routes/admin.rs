//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, backup, feedback};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                       -> list_users (?search, limit, offset)
/// POST   /users                       -> create_user
/// GET    /users/{id}                  -> get_user
/// PUT    /users/{id}                  -> update_user
/// DELETE /users/{id}                  -> deactivate_user
/// PUT    /users/{id}/role             -> update_user_role
/// POST   /users/{id}/reset-password   -> reset_password
/// GET    /roles                       -> list_roles
/// GET    /feedback                    -> list_feedback (?status, limit, offset)
/// PUT    /feedback/contact/{id}       -> update_contact_status
/// GET    /dashboard                   -> dashboard
/// POST   /backups                     -> create_backup
/// GET    /backups                     -> list_backups
/// GET    /backups/{name}              -> get_backup
/// DELETE /backups/{name}              -> delete_backup
/// POST   /backups/{name}/restore      -> restore_backup
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route("/users/{id}/role", put(admin::update_user_role))
        .route("/users/{id}/reset-password", post(admin::reset_password))
        .route("/roles", get(admin::list_roles))
        .route("/feedback", get(feedback::list_feedback))
        .route(
            "/feedback/contact/{id}",
            put(feedback::update_contact_status),
        )
        .route("/dashboard", get(admin::dashboard))
        .route(
            "/backups",
            post(backup::create_backup).get(backup::list_backups),
        )
        .route(
            "/backups/{name}",
            get(backup::get_backup).delete(backup::delete_backup),
        )
        .route("/backups/{name}/restore", post(backup::restore_backup))
}
