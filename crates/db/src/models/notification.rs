//! Notification entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use staywatch_core::types::{DbId, Timestamp};

/// Number of notifications returned by an inbox listing.
pub const INBOX_LIMIT: i64 = 20;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_station_id: DbId,
    pub recipient_user_id: DbId,
    pub message: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub recipient_station_id: DbId,
    pub recipient_user_id: DbId,
    pub message: String,
}
