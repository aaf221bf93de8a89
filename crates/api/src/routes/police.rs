//! Route definitions for the `/police` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::police;
use crate::state::AppState;

/// Routes mounted at `/police`. Police accounts only.
///
/// ```text
/// GET  /dashboard             -> dashboard
/// POST /search                -> search_guests
/// GET  /alerts                -> list_alerts
/// POST /alerts                -> create_alert
/// PUT  /alerts/{id}/resolve   -> resolve_alert
/// GET  /guests/{id}/history   -> guest_history
/// POST /guests/{id}/remarks   -> add_remark
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(police::dashboard))
        .route("/search", post(police::search_guests))
        .route(
            "/alerts",
            get(police::list_alerts).post(police::create_alert),
        )
        .route("/alerts/{id}/resolve", put(police::resolve_alert))
        .route("/guests/{id}/history", get(police::guest_history))
        .route("/guests/{id}/remarks", post(police::add_remark))
}
