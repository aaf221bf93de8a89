use std::sync::Arc;

use staywatch_db::Stores;

use crate::auth::tokens::TokenService;
use crate::config::ServerConfig;
use crate::rate_limit::LoginRateLimiter;
use crate::tasks::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Persistence handles, one per store concern.
    pub stores: Stores,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Token issuance, verification and the revocation list.
    pub tokens: Arc<TokenService>,
    /// Per-IP login throttle.
    pub login_limiter: Arc<LoginRateLimiter>,
    /// Outbound mail for post-commit notices.
    pub mailer: Arc<dyn Mailer>,
}
