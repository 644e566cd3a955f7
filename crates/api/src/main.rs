use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sborrowhub_api::background::{overdue_sweeper, session_cleanup};
use sborrowhub_api::config::ServerConfig;
use sborrowhub_api::router::build_app_router;
use sborrowhub_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    // LOG_FORMAT=json switches to one JSON object per line.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sborrowhub_api=debug,sborrowhub_events=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        late_penalty_per_day = config.lending.late_penalty_per_day,
        max_loan_days = config.lending.max_loan_days,
        backup_dir = %config.backup.dir.display(),
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = sborrowhub_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    sborrowhub_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    sborrowhub_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(sborrowhub_events::EventBus::default());
    let writer_handle = tokio::spawn(sborrowhub_events::NotificationWriter::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let sweeper_handle = tokio::spawn(overdue_sweeper::run(
        pool.clone(),
        Arc::clone(&event_bus),
        Duration::from_secs(config.lending.overdue_sweep_interval_secs),
        cancel.clone(),
    ));
    let cleanup_handle = tokio::spawn(session_cleanup::run(pool.clone(), cancel.clone()));
    tracing::info!("Background services started (notification writer, overdue sweeper, session cleanup)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    cancel.cancel();
    let _ = tokio::time::timeout(grace, sweeper_handle).await;
    let _ = tokio::time::timeout(grace, cleanup_handle).await;

    // The router (and with it the last state clone) is gone; dropping this
    // sender closes the channel and lets the writer drain and exit.
    drop(event_bus);
    let _ = tokio::time::timeout(grace, writer_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
