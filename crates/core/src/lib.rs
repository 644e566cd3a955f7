//! Domain types and rules for SBorrowHub.
//!
//! Everything in this crate is free of I/O: the borrow lifecycle state
//! machine, stock arithmetic, settings defaults and naming rules live here so
//! both the repository layer and the HTTP layer share one definition.

pub mod backup;
pub mod error;
pub mod feedback;
pub mod inventory;
pub mod lifecycle;
pub mod notifications;
pub mod roles;
pub mod search;
pub mod settings;
pub mod types;
