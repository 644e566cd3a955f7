use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sborrowhub_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Lifecycle events; the notification writer subscribes to it.
    pub event_bus: Arc<sborrowhub_events::EventBus>,
}
