//! Handlers for `/users/me`: the caller's own account and profile.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use staywatch_core::account::{normalize_email, validate_password_strength};
use staywatch_core::error::CoreError;
use staywatch_db::models::user::{UpdateProfile, UserProfile, UserResponse};

use super::internal;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{AnyRole, RequireRole};
use crate::response::{ApiJson, DataResponse, MessageResponse};
use crate::state::AppState;

/// Request body for `PUT /users/me/password`.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Request body for `PUT /users/me`. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// GET /api/v1/users/me
pub async fn me(
    RequireRole(auth, _): RequireRole<AnyRole>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    Ok(Json(DataResponse {
        data: UserResponse::from(&auth.user),
    }))
}

/// PUT /api/v1/users/me
///
/// Role, status and station are administrative and cannot be changed here.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireRole(auth, _): RequireRole<AnyRole>,
    ApiJson(input): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<MessageResponse<UserResponse>>> {
    let email = input.email.as_deref().map(normalize_email).transpose()?;
    let user_id = auth.user.id;

    let user = state
        .stores
        .credentials
        .update_profile(
            user_id,
            &UpdateProfile {
                email,
                profile: input.profile,
            },
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "user",
            id: user_id,
        })?;

    tracing::info!(user_id, "Profile updated");

    Ok(Json(MessageResponse {
        data: UserResponse::from(&user),
        message: "profile updated successfully",
    }))
}

/// PUT /api/v1/users/me/password
pub async fn update_password(
    State(state): State<AppState>,
    RequireRole(auth, _): RequireRole<AnyRole>,
    ApiJson(input): ApiJson<UpdatePasswordRequest>,
) -> AppResult<Json<MessageResponse<()>>> {
    validate_password_strength(&input.new_password)?;

    let matches = verify_password(&input.old_password, &auth.user.password_hash)
        .map_err(|e| internal("Password verification error", e))?;
    if !matches {
        return Err(AppError::Core(CoreError::Unauthorized(
            "current password is incorrect".into(),
        )));
    }

    let hash =
        hash_password(&input.new_password).map_err(|e| internal("Password hashing error", e))?;
    state
        .stores
        .credentials
        .update_password(auth.user.id, &hash, false)
        .await?;

    tracing::info!(user_id = auth.user.id, "Password updated");

    Ok(Json(MessageResponse {
        data: (),
        message: "password updated successfully",
    }))
}
