//! Snapshot of the lending tables written to and read from backup files.
//!
//! Users, roles, sessions and settings are not part of a snapshot; a restore
//! only replaces lending data and expects every referenced user to exist.

use sborrowhub_core::types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::models::borrow_request::BorrowRequest;
use crate::models::contact_message::ContactMessage;
use crate::models::item::Item;
use crate::models::notification::Notification;
use crate::models::review::Review;
use crate::models::transaction::Transaction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub format_version: i32,
    pub created_at: Timestamp,
    pub items: Vec<Item>,
    pub borrow_requests: Vec<BorrowRequest>,
    pub transactions: Vec<Transaction>,
    pub reviews: Vec<Review>,
    pub contact_messages: Vec<ContactMessage>,
    pub notifications: Vec<Notification>,
}

impl Snapshot {
    /// Row counts per table, for logging and API responses.
    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            items: self.items.len(),
            borrow_requests: self.borrow_requests.len(),
            transactions: self.transactions.len(),
            reviews: self.reviews.len(),
            contact_messages: self.contact_messages.len(),
            notifications: self.notifications.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotCounts {
    pub items: usize,
    pub borrow_requests: usize,
    pub transactions: usize,
    pub reviews: usize,
    pub contact_messages: usize,
    pub notifications: usize,
}
