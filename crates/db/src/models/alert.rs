//! Alert entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use staywatch_core::guest::AlertStatus;
use staywatch_core::types::{DbId, Timestamp};

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub guest_id: DbId,
    pub created_by: DbId,
    pub reason: String,
    #[sqlx(try_from = "String")]
    pub status: AlertStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An alert joined with the flagged guest and the raising officer, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub alert: Alert,
    pub guest_name: String,
    pub guest_customer_id: String,
    /// `None` once the raising account has been deleted.
    pub created_by_username: Option<String>,
}

/// DTO for raising an alert.
#[derive(Debug, Clone)]
pub struct CreateAlert {
    pub guest_id: DbId,
    pub created_by: DbId,
    pub reason: String,
}
