//! Event names published by the lifecycle and the notification kinds they
//! produce for borrowers.

pub const EVENT_REQUEST_SUBMITTED: &str = "borrow_request.submitted";
pub const EVENT_REQUEST_APPROVED: &str = "borrow_request.approved";
pub const EVENT_REQUEST_REJECTED: &str = "borrow_request.rejected";
pub const EVENT_TRANSACTION_RETURNED: &str = "transaction.returned";
pub const EVENT_TRANSACTION_OVERDUE: &str = "transaction.overdue";

pub const KIND_REQUEST_APPROVED: &str = "request_approved";
pub const KIND_REQUEST_REJECTED: &str = "request_rejected";
pub const KIND_RETURN_PROCESSED: &str = "return_processed";
pub const KIND_OVERDUE: &str = "overdue";

/// Map an event name to the notification kind sent to the borrower.
///
/// Returns `None` for events that do not notify the borrower.
pub fn kind_for_event(event_type: &str) -> Option<&'static str> {
    match event_type {
        EVENT_REQUEST_APPROVED => Some(KIND_REQUEST_APPROVED),
        EVENT_REQUEST_REJECTED => Some(KIND_REQUEST_REJECTED),
        EVENT_TRANSACTION_RETURNED => Some(KIND_RETURN_PROCESSED),
        EVENT_TRANSACTION_OVERDUE => Some(KIND_OVERDUE),
        _ => None,
    }
}
