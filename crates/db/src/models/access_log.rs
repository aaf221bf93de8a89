//! Access log entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use staywatch_core::types::{DbId, Timestamp};

/// A row from the append-only `access_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccessLog {
    pub id: DbId,
    pub user_id: DbId,
    /// Actor's username when the entry was written.
    pub username: String,
    pub action: String,
    pub search_query: Option<String>,
    pub reason: String,
    pub created_at: Timestamp,
}

/// DTO for appending an entry.
#[derive(Debug, Clone)]
pub struct CreateAccessLog {
    pub user_id: DbId,
    pub username: String,
    pub action: String,
    pub search_query: Option<String>,
    pub reason: String,
}
