//! Periodic overdue detection.
//!
//! Loans still out after their return date are flagged `overdue` and the
//! borrower is notified through the event bus. The same sweep backs the
//! officer's on-demand `POST /officer/refresh-overdue`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sborrowhub_core::lifecycle::days_overdue;
use sborrowhub_core::notifications::EVENT_TRANSACTION_OVERDUE;
use sborrowhub_core::types::{DbId, Timestamp};
use sborrowhub_db::models::transaction::Transaction;
use sborrowhub_db::repositories::{ItemRepo, TransactionRepo};
use sborrowhub_db::DbPool;
use sborrowhub_events::{EventBus, PlatformEvent};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Flag overdue loans as of `now` and publish one event per flagged loan.
///
/// `actor` is the officer who asked for the sweep, if any.
pub async fn sweep(
    pool: &DbPool,
    bus: &EventBus,
    now: Timestamp,
    actor: Option<DbId>,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let flagged = TransactionRepo::mark_overdue(pool, now).await?;

    let mut item_names: HashMap<DbId, String> = HashMap::new();
    for txn in &flagged {
        if !item_names.contains_key(&txn.item_id) {
            let name = ItemRepo::find_by_id(pool, txn.item_id)
                .await?
                .map(|i| i.name)
                .unwrap_or_default();
            item_names.insert(txn.item_id, name);
        }

        let mut event = PlatformEvent::new(EVENT_TRANSACTION_OVERDUE)
            .with_source("transaction", txn.id)
            .for_user(txn.borrower_id)
            .with_payload(json!({
                "item_name": item_names.get(&txn.item_id),
                "quantity": txn.quantity_borrowed,
                "days_overdue": days_overdue(txn.return_date, now),
            }));
        if let Some(actor) = actor {
            event = event.with_actor(actor);
        }
        bus.publish(event);
    }

    Ok(flagged)
}

/// Run the sweep every `interval` until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    bus: Arc<EventBus>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Overdue sweeper started"
    );

    let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Overdue sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                match sweep(&pool, &bus, Utc::now(), None).await {
                    Ok(flagged) if !flagged.is_empty() => {
                        tracing::info!(flagged = flagged.len(), "Overdue sweeper: loans flagged");
                    }
                    Ok(_) => tracing::debug!("Overdue sweeper: nothing overdue"),
                    Err(e) => tracing::error!(error = %e, "Overdue sweeper: sweep failed"),
                }
            }
        }
    }
}
