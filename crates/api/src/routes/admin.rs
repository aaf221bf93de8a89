//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `RegionalAdmin` role (enforced by handler extractors).
///
/// ```text
/// GET    /dashboard           -> dashboard
/// GET    /users               -> list_users
/// POST   /users               -> create_user
/// PUT    /users/{id}/status   -> update_user_status
/// DELETE /users/{id}          -> delete_user
/// GET    /stations            -> list_stations
/// POST   /stations            -> create_station
/// GET    /access-logs         -> list_access_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/status", put(admin::update_user_status))
        .route(
            "/stations",
            get(admin::list_stations).post(admin::create_station),
        )
        .route("/access-logs", get(admin::list_access_logs))
}
