//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the live user behind a Bearer token.
//! - [`rbac::RequireRole`] -- Additionally requires one of a route group's roles.

pub mod auth;
pub mod rbac;
