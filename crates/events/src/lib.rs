//! SBorrowHub event bus and borrower notifications.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the lifecycle event envelope.
//! - [`NotificationWriter`] -- background service that turns lifecycle
//!   events into notification rows for the affected borrower.

pub mod bus;
pub mod notification_writer;

pub use bus::{EventBus, PlatformEvent};
pub use notification_writer::NotificationWriter;
