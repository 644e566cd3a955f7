//! Borrower notifications from lifecycle events.
//!
//! [`NotificationWriter`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes one `notifications` row per lifecycle event addressed to a
//! borrower. It runs as a long-lived background task and shuts down when the
//! bus sender is dropped.

use sborrowhub_core::notifications::{
    kind_for_event, KIND_OVERDUE, KIND_REQUEST_APPROVED, KIND_REQUEST_REJECTED,
    KIND_RETURN_PROCESSED,
};
use sborrowhub_db::models::notification::{CreateNotification, Notification};
use sborrowhub_db::repositories::NotificationRepo;
use sborrowhub_db::DbPool;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Background service that persists borrower notifications.
pub struct NotificationWriter;

impl NotificationWriter {
    /// Run the writer loop.
    ///
    /// The loop exits when the channel is closed (the
    /// [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let Some(input) = compose(&event) else {
                        continue;
                    };
                    match Self::persist(&pool, &input).await {
                        Ok(n) => tracing::debug!(
                            notification_id = n.id,
                            user_id = n.user_id,
                            kind = %n.kind,
                            "Notification stored"
                        ),
                        Err(e) => tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to store notification"
                        ),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification writer lagged, some notifications were not stored"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification writer shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, input: &CreateNotification) -> Result<Notification, sqlx::Error> {
        NotificationRepo::create(pool, input).await
    }
}

/// Word the notification for an event.
///
/// Returns `None` for events that do not notify anyone or that carry no
/// target user.
pub fn compose(event: &PlatformEvent) -> Option<CreateNotification> {
    let kind = kind_for_event(&event.event_type)?;
    let user_id = event.target_user_id?;
    let payload = &event.payload;
    let item = str_field(payload, "item_name").unwrap_or("your item");
    let quantity = payload.get("quantity").and_then(Value::as_i64).unwrap_or(1);

    let (title, message) = match kind {
        KIND_REQUEST_APPROVED => (
            "Borrow request approved".to_string(),
            format!("Your request for {quantity} x {item} was approved."),
        ),
        KIND_REQUEST_REJECTED => {
            let reason = str_field(payload, "rejection_reason").unwrap_or("no reason given");
            (
                "Borrow request rejected".to_string(),
                format!("Your request for {quantity} x {item} was rejected: {reason}"),
            )
        }
        KIND_RETURN_PROCESSED => {
            let days = payload.get("days_overdue").and_then(Value::as_i64).unwrap_or(0);
            let penalty = payload.get("penalty_amount").and_then(Value::as_i64).unwrap_or(0);
            let message = if days > 0 {
                format!(
                    "Return of {item} recorded {days} day(s) late. Penalty: {}.",
                    format_minor_units(penalty)
                )
            } else {
                format!("Return of {item} recorded on time. Thank you!")
            };
            ("Return processed".to_string(), message)
        }
        KIND_OVERDUE => (
            "Loan overdue".to_string(),
            format!("{item} is past its return date. Please return it as soon as possible."),
        ),
        _ => return None,
    };

    Some(CreateNotification {
        user_id,
        kind: kind.to_string(),
        title,
        message,
        entity_type: event.source_entity_type.clone(),
        entity_id: event.source_entity_id,
    })
}

fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

/// Render minor currency units as `major.minor`.
fn format_minor_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn approval_notifies_borrower() {
        let event = PlatformEvent::new("borrow_request.approved")
            .with_source("borrow_request", 5)
            .with_actor(1)
            .for_user(9)
            .with_payload(json!({"item_name": "Projector", "quantity": 3}));

        let n = compose(&event).expect("approval should notify");
        assert_eq!(n.user_id, 9);
        assert_eq!(n.kind, "request_approved");
        assert_eq!(n.message, "Your request for 3 x Projector was approved.");
        assert_eq!(n.entity_type.as_deref(), Some("borrow_request"));
        assert_eq!(n.entity_id, Some(5));
    }

    #[test]
    fn rejection_includes_reason() {
        let event = PlatformEvent::new("borrow_request.rejected")
            .for_user(9)
            .with_payload(json!({"item_name": "Tripod", "quantity": 1, "rejection_reason": "Reserved"}));

        let n = compose(&event).unwrap();
        assert!(n.message.ends_with("rejected: Reserved"));
    }

    #[test]
    fn late_return_mentions_penalty() {
        let event = PlatformEvent::new("transaction.returned")
            .for_user(9)
            .with_payload(json!({"item_name": "Laptop", "days_overdue": 2, "penalty_amount": 1050}));

        let n = compose(&event).unwrap();
        assert_eq!(n.kind, "return_processed");
        assert!(n.message.contains("2 day(s) late"));
        assert!(n.message.contains("10.50"));
    }

    #[test]
    fn submission_and_untargeted_events_are_skipped() {
        assert!(compose(&PlatformEvent::new("borrow_request.submitted").for_user(1)).is_none());
        assert!(compose(&PlatformEvent::new("transaction.overdue")).is_none());
    }

    #[test]
    fn minor_units_render_with_two_decimals() {
        assert_eq!(format_minor_units(0), "0.00");
        assert_eq!(format_minor_units(5), "0.05");
        assert_eq!(format_minor_units(12345), "123.45");
    }
}
