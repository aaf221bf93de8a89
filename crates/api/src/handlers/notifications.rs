//! Handlers for a police officer's notification inbox.

use axum::extract::State;
use axum::Json;
use staywatch_core::error::CoreError;
use staywatch_core::types::DbId;
use staywatch_db::models::notification::{Notification, INBOX_LIMIT};

use crate::error::AppResult;
use crate::middleware::rbac::{PoliceOnly, RequireRole};
use crate::response::{ApiPath, DataResponse, MessageResponse};
use crate::state::AppState;

/// GET /api/v1/notifications
///
/// The caller's most recent notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    RequireRole(auth, _): RequireRole<PoliceOnly>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let notifications = state
        .stores
        .notifications
        .notifications_for(auth.user.id, INBOX_LIMIT)
        .await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// PUT /api/v1/notifications/{id}/read
///
/// Idempotent. Someone else's notification is reported as missing.
pub async fn mark_read(
    State(state): State<AppState>,
    RequireRole(auth, _): RequireRole<PoliceOnly>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<MessageResponse<Notification>>> {
    let notification = state
        .stores
        .notifications
        .mark_read(id, auth.user.id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "notification",
            id,
        })?;
    Ok(Json(MessageResponse {
        data: notification,
        message: "notification marked as read",
    }))
}
