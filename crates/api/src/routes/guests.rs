//! Route definitions for the `/guests` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::guests;
use crate::state::AppState;

/// Routes mounted at `/guests`. Hotel accounts only.
///
/// ```text
/// GET  /                -> list_guests
/// POST /                -> register_guest
/// GET  /today           -> list_todays_guests
/// PUT  /{id}/checkout   -> check_out
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(guests::list_guests).post(guests::register_guest))
        .route("/today", get(guests::list_todays_guests))
        .route("/{id}/checkout", put(guests::check_out))
}
