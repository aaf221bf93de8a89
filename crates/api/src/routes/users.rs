//! Route definitions for the `/users` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET /me           -> me
/// PUT /me           -> update_profile
/// PUT /me/password  -> update_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me).put(users::update_profile))
        .route("/me/password", put(users::update_password))
}
