//! Fixed-window login throttle keyed by client IP.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use crate::config::LoginRateLimit;
use crate::error::AppError;
use crate::state::AppState;

/// Key used when no client address can be determined.
const UNKNOWN_CLIENT: &str = "unknown";

struct Window {
    started: Instant,
    attempts: u32,
}

/// Counts attempts per client within fixed windows.
pub struct LoginRateLimiter {
    max_attempts: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl LoginRateLimiter {
    pub fn new(limit: LoginRateLimit) -> Self {
        Self {
            max_attempts: limit.max_attempts,
            window: Duration::from_secs(limit.window_secs),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one attempt from `client`. Returns `false` once the client has
    /// used up its attempts in the current window.
    pub fn try_acquire(&self, client: &str) -> bool {
        let now = Instant::now();
        let Ok(mut windows) = self.windows.lock() else {
            // A poisoned counter must not lock every client out.
            return true;
        };
        windows.retain(|_, w| now.duration_since(w.started) < self.window);
        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            attempts: 0,
        });
        window.attempts += 1;
        window.attempts <= self.max_attempts
    }

    fn rejection_message(&self) -> String {
        let minutes = (self.window.as_secs() / 60).max(1);
        format!("too many login attempts from this ip, please try again after {minutes} minutes")
    }
}

/// Client address: the socket peer, or the first `X-Forwarded-For` hop when
/// the deployment sits behind a trusted proxy.
fn client_key(parts: &Parts, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Extractor that spends one login attempt for the calling client, rejecting
/// with 429 when the window's budget is exhausted.
pub struct LoginThrottle;

impl FromRequestParts<AppState> for LoginThrottle {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let client = client_key(parts, state.config.trust_proxy);
        if state.login_limiter.try_acquire(&client) {
            Ok(LoginThrottle)
        } else {
            tracing::warn!(%client, "Login rate limit exceeded");
            Err(AppError::TooManyRequests(state.login_limiter.rejection_message()))
        }
    }
}
