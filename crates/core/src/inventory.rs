//! Item stock rules.
//!
//! An item owns `quantity` units, of which `available` are on the shelf.
//! At rest `0 <= available <= quantity` must hold; the database enforces the
//! same rule with a CHECK constraint and guarded updates.

use crate::error::CoreError;

pub const CONDITION_NEW: &str = "new";
pub const CONDITION_GOOD: &str = "good";
pub const CONDITION_FAIR: &str = "fair";
pub const CONDITION_DAMAGED: &str = "damaged";

/// All accepted item condition values.
pub const VALID_CONDITIONS: &[&str] = &[
    CONDITION_NEW,
    CONDITION_GOOD,
    CONDITION_FAIR,
    CONDITION_DAMAGED,
];

/// Validate that a condition string is one of the accepted values.
pub fn validate_condition(condition: &str) -> Result<(), CoreError> {
    if VALID_CONDITIONS.contains(&condition) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid condition '{condition}'. Must be one of: {}",
            VALID_CONDITIONS.join(", ")
        )))
    }
}

/// Check the stock invariant for a pair of counts.
pub fn validate_counts(quantity: i32, available: i32) -> Result<(), CoreError> {
    if quantity < 0 {
        return Err(CoreError::Validation(
            "quantity must not be negative".to_string(),
        ));
    }
    if available < 0 || available > quantity {
        return Err(CoreError::Validation(format!(
            "available ({available}) must be between 0 and quantity ({quantity})"
        )));
    }
    Ok(())
}

/// Units currently lent out.
pub fn lent_out(quantity: i32, available: i32) -> i32 {
    quantity - available
}

/// Recompute `available` after an officer changes the total quantity.
///
/// Units already lent stay lent, so the new total may not drop below them.
pub fn rebalance(quantity: i32, available: i32, new_quantity: i32) -> Result<i32, CoreError> {
    validate_counts(quantity, available)?;
    let lent = lent_out(quantity, available);
    if new_quantity < lent {
        return Err(CoreError::Conflict(format!(
            "Cannot reduce quantity to {new_quantity}: {lent} unit(s) are currently borrowed"
        )));
    }
    Ok(new_quantity - lent)
}

/// Whether a request for `requested` units could be served right now.
pub fn can_fulfil(available: i32, requested: i32) -> bool {
    requested > 0 && available >= requested
}
