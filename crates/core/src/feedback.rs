//! Contact message statuses and review rules.

use crate::error::CoreError;

pub const CONTACT_UNREAD: &str = "unread";
pub const CONTACT_READ: &str = "read";
pub const CONTACT_RESOLVED: &str = "resolved";

/// All accepted contact message statuses.
pub const VALID_CONTACT_STATUSES: &[&str] = &[CONTACT_UNREAD, CONTACT_READ, CONTACT_RESOLVED];

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Validate a contact message status value.
pub fn validate_contact_status(status: &str) -> Result<(), CoreError> {
    if VALID_CONTACT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid status '{status}'. Must be one of: {}",
            VALID_CONTACT_STATUSES.join(", ")
        )))
    }
}

/// A borrower may review a loan only after the items came back.
pub fn ensure_reviewable(request_approved: bool, returned: bool) -> Result<(), CoreError> {
    if !request_approved {
        return Err(CoreError::Conflict(
            "Only approved borrow requests can be reviewed".to_string(),
        ));
    }
    if !returned {
        return Err(CoreError::Conflict(
            "Items must be returned before they can be reviewed".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn contact_statuses() {
        assert!(validate_contact_status(CONTACT_RESOLVED).is_ok());
        assert_matches!(validate_contact_status("archived"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn review_requires_returned_approved_loan() {
        assert!(ensure_reviewable(true, true).is_ok());
        assert_matches!(ensure_reviewable(false, false), Err(CoreError::Conflict(_)));
        assert_matches!(ensure_reviewable(true, false), Err(CoreError::Conflict(_)));
    }
}
