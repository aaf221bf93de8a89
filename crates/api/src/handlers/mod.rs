pub mod admin;
pub mod auth;
pub mod guests;
pub mod notifications;
pub mod police;
pub mod users;

use crate::error::AppError;

/// Wrap a hashing or signing failure as a sanitized 500.
pub(crate) fn internal(context: &str, err: impl std::fmt::Display) -> AppError {
    AppError::InternalError(format!("{context}: {err}"))
}
