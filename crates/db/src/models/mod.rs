//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts, validated with `validator`
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod backup;
pub mod borrow_request;
pub mod contact_message;
pub mod dashboard;
pub mod item;
pub mod notification;
pub mod review;
pub mod role;
pub mod session;
pub mod settings;
pub mod transaction;
pub mod user;
