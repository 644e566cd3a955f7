//! Request handlers, one module per resource.
//!
//! Handlers take their role guard as an extractor, delegate to the
//! repositories in `sborrowhub_db`, and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod admin;
pub mod auth;
pub mod backup;
pub mod borrow_request;
pub mod catalog;
pub mod contact;
pub mod dashboard;
pub mod feedback;
pub mod notification;
pub mod officer;
pub mod review;
pub mod settings;
