//! Errors returned by repository operations that enforce domain rules.
//!
//! Plain CRUD methods return `sqlx::Error` directly; methods that can also
//! refuse a change for domain reasons (stock, lifecycle state) return
//! [`RepoError`].

use sborrowhub_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
