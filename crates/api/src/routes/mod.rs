pub mod admin;
pub mod auth;
pub mod guests;
pub mod health;
pub mod notifications;
pub mod police;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public, rate limited)
/// /auth/change-password                replace temporary password (public)
/// /auth/logout                         logout (any role)
///
/// /users/me                            own profile (any role)
/// /users/me/password                   change own password (any role)
///
/// /admin/users                         list, provision (RegionalAdmin)
/// /admin/users/{id}                    delete
/// /admin/users/{id}/status             suspend / reactivate
/// /admin/stations                      list, create
/// /admin/access-logs                   audit trail
///
/// /guests                              list, register (Hotel)
/// /guests/today                        registered today
/// /guests/{id}/checkout                check out
///
/// /police/search                       audited guest search (Police)
/// /police/alerts                       list, raise
/// /police/alerts/{id}/resolve          resolve
/// /police/guests/{id}/history          stays sharing an id number
///
/// /notifications                       inbox (Police)
/// /notifications/{id}/read             mark read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .nest("/guests", guests::router())
        .nest("/police", police::router())
        .nest("/notifications", notifications::router())
}
