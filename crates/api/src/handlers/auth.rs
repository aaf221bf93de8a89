//! Handlers for the `/auth` resource (login, first-login password change, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use staywatch_core::account::{normalize_identity, validate_password_strength};
use staywatch_core::error::CoreError;
use staywatch_core::roles::Role;
use staywatch_core::types::DbId;

use super::internal;
use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, ACCOUNT_SUSPENDED};
use crate::rate_limit::LoginThrottle;
use crate::response::{ApiJson, DataResponse, MessageResponse};
use crate::state::AppState;

/// Identical for an unknown email and a wrong password.
const INVALID_CREDENTIALS: &str = "invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub user_id: Option<DbId>,
    pub new_password: Option<String>,
}

/// Successful login payload.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserInfo,
    pub token: String,
}

/// Public user info embedded in [`LoginResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Returned with 202 when the account must set a new password first.
#[derive(Debug, Serialize)]
pub struct PasswordChangePending {
    pub user_id: DbId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// 200 with a session token, or 202 with the user id when the account still
/// has to replace its temporary password.
pub async fn login(
    State(state): State<AppState>,
    _throttle: LoginThrottle,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let email = normalize_identity(&input.email);

    let Some(user) = state.stores.credentials.find_user_by_email(&email).await? else {
        verify_dummy(&input.password);
        tracing::info!(%email, "Login failed: unknown email");
        return Err(AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())));
    };

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| internal("Password verification error", e))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login failed: wrong password");
        return Err(AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())));
    }

    if user.is_suspended() {
        return Err(AppError::Core(CoreError::Forbidden(ACCOUNT_SUSPENDED.into())));
    }

    if user.password_change_required {
        tracing::info!(user_id = user.id, "Login deferred: password change required");
        let body = MessageResponse {
            data: PasswordChangePending { user_id: user.id },
            message: "password change required",
        };
        return Ok((StatusCode::ACCEPTED, Json(body)).into_response());
    }

    let token = state
        .tokens
        .issue(user.id, user.role, &user.username)
        .map_err(|e| internal("Token generation error", e))?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    let body = DataResponse {
        data: LoginResponse {
            user: UserInfo {
                id: user.id,
                username: user.username,
                email: user.email,
                role: user.role,
            },
            token,
        },
    };
    Ok(Json(body).into_response())
}

/// POST /api/v1/auth/change-password
///
/// Replace a temporary password. Unauthenticated: the caller has no token
/// until this succeeds.
pub async fn change_password(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse<()>>> {
    let (Some(user_id), Some(new_password)) = (input.user_id, input.new_password) else {
        return Err(AppError::Core(CoreError::Validation(
            "user id and new password are required".into(),
        )));
    };
    validate_password_strength(&new_password)?;

    let hash = hash_password(&new_password).map_err(|e| internal("Password hashing error", e))?;
    let updated = state
        .stores
        .credentials
        .update_password(user_id, &hash, false)
        .await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user_id,
        }));
    }

    tracing::info!(user_id, "Temporary password replaced");

    Ok(Json(MessageResponse {
        data: (),
        message: "password changed successfully, please log in",
    }))
}

/// POST /api/v1/auth/logout
///
/// Revoke the presented token until its natural expiry. If the revocation
/// list cannot be written the logout is not confirmed.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<MessageResponse<()>>> {
    state
        .tokens
        .revoke(&auth.token)
        .await
        .map_err(|e| internal("Token revocation failed", e))?;

    tracing::info!(user_id = auth.user.id, "User logged out");

    Ok(Json(MessageResponse {
        data: (),
        message: "logged out successfully",
    }))
}
