//! Bearer-token gate for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use staywatch_core::error::CoreError;
use staywatch_db::models::user::User;

use crate::error::AppError;
use crate::state::AppState;

const NO_TOKEN: &str = "not authorized, no token provided";
const TOKEN_REVOKED: &str = "not authorized, token has been invalidated";
const TOKEN_FAILED: &str = "not authorized, token failed";
const USER_NOT_FOUND: &str = "not authorized, user not found";
pub(crate) const ACCOUNT_SUSPENDED: &str = "your account has been suspended";

/// The caller behind a verified, unrevoked Bearer token.
///
/// `user` is re-read from the credential store on every request, so role
/// changes, suspensions and deletions take effect immediately.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user.id, role = %auth.user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// The raw token, kept so logout can revoke it.
    pub token: String,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| unauthorized(NO_TOKEN))?;

        match state.tokens.is_revoked(token).await {
            Ok(false) => {}
            Ok(true) => return Err(unauthorized(TOKEN_REVOKED)),
            Err(e) => {
                tracing::error!(error = %e, "Revocation check failed, rejecting request");
                return Err(unauthorized(TOKEN_FAILED));
            }
        }

        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            unauthorized(TOKEN_FAILED)
        })?;

        let user = state
            .stores
            .credentials
            .find_user(claims.sub)
            .await?
            .ok_or_else(|| unauthorized(USER_NOT_FOUND))?;

        if user.is_suspended() {
            return Err(AppError::Core(CoreError::Forbidden(ACCOUNT_SUSPENDED.into())));
        }

        Ok(AuthUser {
            user,
            token: token.to_string(),
        })
    }
}
