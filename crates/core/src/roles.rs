//! Well-known role name constants.
//!
//! These must match the seed data in `20261001000002_create_roles_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_OFFICER: &str = "officer";
pub const ROLE_BORROWER: &str = "borrower";

/// Role assigned to self-registered accounts.
pub const DEFAULT_ROLE: &str = ROLE_BORROWER;

/// Whether the role may approve requests and manage inventory.
pub fn can_act_as_officer(role: &str) -> bool {
    role == ROLE_OFFICER || role == ROLE_ADMIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn officer_and_admin_can_act_as_officer() {
        assert!(can_act_as_officer(ROLE_OFFICER));
        assert!(can_act_as_officer(ROLE_ADMIN));
    }

    #[test]
    fn borrower_cannot_act_as_officer() {
        assert!(!can_act_as_officer(ROLE_BORROWER));
        assert!(!can_act_as_officer("unknown"));
    }
}
