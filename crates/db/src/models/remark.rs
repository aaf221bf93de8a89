//! Remark entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use staywatch_core::types::{DbId, Timestamp};

/// A row from the `remarks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Remark {
    pub id: DbId,
    pub guest_id: DbId,
    pub officer_id: DbId,
    pub text: String,
    pub created_at: Timestamp,
}

/// A remark with the writing officer's username resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RemarkDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub remark: Remark,
    /// `None` once the officer's account has been deleted.
    pub officer_username: Option<String>,
}

/// DTO for adding a remark. `text` must already be trimmed and non-empty.
#[derive(Debug, Clone)]
pub struct CreateRemark {
    pub guest_id: DbId,
    pub officer_id: DbId,
    pub text: String,
}
