//! Borrow request and transaction lifecycle.
//!
//! Requests move `pending -> approved | rejected` and never change again.
//! An approval opens a transaction, which is `completed` while the items are
//! out, may become `overdue` once the return date passes, and is closed by
//! an officer as `completed` (on time) or `returned_late`.
//!
//! Statuses are stored as text and parsed into the typed states below.
//! Every decision goes through those states, so an invalid transition is
//! rejected before anything is written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

pub const REQUEST_PENDING: &str = "pending";
pub const REQUEST_APPROVED: &str = "approved";
pub const REQUEST_REJECTED: &str = "rejected";

pub const TRANSACTION_COMPLETED: &str = "completed";
pub const TRANSACTION_OVERDUE: &str = "overdue";
pub const TRANSACTION_RETURNED_LATE: &str = "returned_late";

/// Milliseconds in one day; overdue days are counted in whole days of this size.
pub const DAY_MS: i64 = 86_400_000;

/// Longest loan window accepted when no configuration overrides it.
pub const DEFAULT_MAX_LOAN_DAYS: i64 = 30;

/// Maximum length of a rejection reason.
pub const MAX_REASON_LEN: usize = 500;

// ---------------------------------------------------------------------------
// Borrow requests
// ---------------------------------------------------------------------------

/// State of a borrow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => REQUEST_PENDING,
            Self::Approved => REQUEST_APPROVED,
            Self::Rejected => REQUEST_REJECTED,
        }
    }

    /// Whether an officer has already decided this request.
    pub fn is_resolved(self) -> bool {
        self != Self::Pending
    }

    /// `pending -> approved`. Any other starting state is a conflict.
    pub fn approve(self) -> Result<Self, CoreError> {
        match self {
            Self::Pending => Ok(Self::Approved),
            resolved => Err(already_resolved(resolved)),
        }
    }

    /// `pending -> rejected`. The reason is checked before the state so a
    /// missing reason is always reported as a validation error.
    pub fn reject(self, reason: &str) -> Result<Self, CoreError> {
        normalize_reason(Some(reason))?;
        match self {
            Self::Pending => Ok(Self::Rejected),
            resolved => Err(already_resolved(resolved)),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            REQUEST_PENDING => Ok(Self::Pending),
            REQUEST_APPROVED => Ok(Self::Approved),
            REQUEST_REJECTED => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid request status '{other}'. Must be one of: \
                 {REQUEST_PENDING}, {REQUEST_APPROVED}, {REQUEST_REJECTED}"
            ))),
        }
    }
}

fn already_resolved(status: RequestStatus) -> CoreError {
    CoreError::Conflict(format!("Borrow request is already {status}"))
}

/// Trim a rejection reason and ensure it is present and bounded.
pub fn normalize_reason(reason: Option<&str>) -> Result<String, CoreError> {
    let trimmed = reason.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "A rejection reason is required".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_REASON_LEN {
        return Err(CoreError::Validation(format!(
            "Rejection reason must be at most {MAX_REASON_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// An officer's decision on a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDecision {
    Approve,
    Reject { reason: String },
}

impl RequestDecision {
    /// Parse the `{ status, rejection_reason }` payload of the officer's
    /// status update. `pending` is not a decision.
    pub fn parse(status: &str, rejection_reason: Option<&str>) -> Result<Self, CoreError> {
        match status.parse::<RequestStatus>()? {
            RequestStatus::Approved => Ok(Self::Approve),
            RequestStatus::Rejected => Ok(Self::Reject {
                reason: normalize_reason(rejection_reason)?,
            }),
            RequestStatus::Pending => Err(CoreError::Validation(
                "A request can only be moved to approved or rejected".to_string(),
            )),
        }
    }

    /// Apply the decision to the current state.
    pub fn apply(&self, current: RequestStatus) -> Result<RequestStatus, CoreError> {
        match self {
            Self::Approve => current.approve(),
            Self::Reject { reason } => current.reject(reason),
        }
    }

    /// The state this decision leads to.
    pub fn target(&self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject { .. } => RequestStatus::Rejected,
        }
    }
}

/// Check the requested loan window: the return date must follow the borrow
/// date and the loan may not exceed `max_days`.
pub fn validate_loan_window(
    borrow_date: Timestamp,
    return_date: Timestamp,
    max_days: i64,
) -> Result<(), CoreError> {
    if return_date <= borrow_date {
        return Err(CoreError::Validation(
            "return_date must be after borrow_date".to_string(),
        ));
    }
    if return_date - borrow_date > chrono::Duration::days(max_days) {
        return Err(CoreError::Validation(format!(
            "Loans may not exceed {max_days} days"
        )));
    }
    Ok(())
}

/// A return can not be recorded before the items were borrowed.
pub fn validate_return_time(
    borrow_date: Timestamp,
    returned_at: Timestamp,
) -> Result<(), CoreError> {
    if returned_at < borrow_date {
        return Err(CoreError::Validation(
            "actual_return_date must not be before borrow_date".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Stored status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Overdue,
    ReturnedLate,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => TRANSACTION_COMPLETED,
            Self::Overdue => TRANSACTION_OVERDUE,
            Self::ReturnedLate => TRANSACTION_RETURNED_LATE,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TRANSACTION_COMPLETED => Ok(Self::Completed),
            TRANSACTION_OVERDUE => Ok(Self::Overdue),
            TRANSACTION_RETURNED_LATE => Ok(Self::ReturnedLate),
            other => Err(CoreError::Validation(format!(
                "Invalid transaction status '{other}'. Must be one of: \
                 {TRANSACTION_COMPLETED}, {TRANSACTION_OVERDUE}, {TRANSACTION_RETURNED_LATE}"
            ))),
        }
    }
}

/// Where a loan stands. The stored status alone is ambiguous (`completed`
/// covers both "items are out" and "returned on time"), so the state is
/// derived together with the actual return date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanState {
    /// Items are out and the return date has not been flagged as passed.
    Outstanding,
    /// Items are out past the return date.
    Overdue,
    /// Items came back.
    Returned { late: bool, returned_at: Timestamp },
}

impl LoanState {
    /// Rebuild the state from a stored row.
    pub fn from_record(
        status: TransactionStatus,
        actual_return_date: Option<Timestamp>,
    ) -> Result<Self, CoreError> {
        match (status, actual_return_date) {
            (TransactionStatus::Completed, None) => Ok(Self::Outstanding),
            (TransactionStatus::Overdue, None) => Ok(Self::Overdue),
            (TransactionStatus::Completed, Some(at)) => Ok(Self::Returned {
                late: false,
                returned_at: at,
            }),
            (TransactionStatus::ReturnedLate, Some(at)) => Ok(Self::Returned {
                late: true,
                returned_at: at,
            }),
            (TransactionStatus::Overdue, Some(_)) | (TransactionStatus::ReturnedLate, None) => {
                Err(CoreError::Internal(format!(
                    "Inconsistent transaction record: status {status} with return date {actual_return_date:?}"
                )))
            }
        }
    }

    /// The status string this state is stored as.
    pub fn status(&self) -> TransactionStatus {
        match self {
            Self::Outstanding => TransactionStatus::Completed,
            Self::Overdue => TransactionStatus::Overdue,
            Self::Returned { late: false, .. } => TransactionStatus::Completed,
            Self::Returned { late: true, .. } => TransactionStatus::ReturnedLate,
        }
    }

    pub fn is_returned(&self) -> bool {
        matches!(self, Self::Returned { .. })
    }

    /// `outstanding -> overdue` once `now` is past the return date. Every
    /// other state is left as is.
    pub fn mark_overdue(self, now: Timestamp, return_date: Timestamp) -> Self {
        match self {
            Self::Outstanding if now > return_date => Self::Overdue,
            other => other,
        }
    }

    /// Close the loan. Late returns are charged `penalty_per_day` for every
    /// started day past the return date.
    pub fn process_return(
        self,
        return_date: Timestamp,
        returned_at: Timestamp,
        penalty_per_day: i64,
    ) -> Result<ReturnOutcome, CoreError> {
        if self.is_returned() {
            return Err(CoreError::Conflict(
                "Transaction has already been returned".to_string(),
            ));
        }

        let days = days_overdue(return_date, returned_at);
        let state = Self::Returned {
            late: days > 0,
            returned_at,
        };

        Ok(ReturnOutcome {
            status: state.status(),
            state,
            days_overdue: days,
            penalty_amount: penalty_amount(days, penalty_per_day),
        })
    }
}

/// Result of closing a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnOutcome {
    pub state: LoanState,
    pub status: TransactionStatus,
    pub days_overdue: i32,
    /// In minor currency units.
    pub penalty_amount: i64,
}

/// Whole days (rounded up) between the due date and the actual return.
/// Returns on or before the due date count as zero.
pub fn days_overdue(return_date: Timestamp, actual_return_date: Timestamp) -> i32 {
    let late_ms = (actual_return_date - return_date).num_milliseconds();
    if late_ms <= 0 {
        return 0;
    }
    let days = (late_ms + DAY_MS - 1) / DAY_MS;
    i32::try_from(days).unwrap_or(i32::MAX)
}

/// Late fee for `days` overdue days at `per_day` minor units per day.
pub fn penalty_amount(days: i32, per_day: i64) -> i64 {
    i64::from(days.max(0)).saturating_mul(per_day.max(0))
}
