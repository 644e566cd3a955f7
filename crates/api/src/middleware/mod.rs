//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller, from a JWT Bearer token. Also usable
//!   as `Option<AuthUser>` on routes open to anonymous callers.
//! - [`rbac::RequireAdmin`] -- `admin` only.
//! - [`rbac::RequireOfficer`] -- `officer` or `admin`.
//! - [`rbac::RequireAuth`] -- any signed-in user.

pub mod auth;
pub mod rbac;
