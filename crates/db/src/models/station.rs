//! Police station entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use staywatch_core::types::{DbId, PostalCode, Timestamp};

/// A row from the `police_stations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PoliceStation {
    pub id: DbId,
    pub name: String,
    pub city: String,
    pub postal_codes: Vec<PostalCode>,
    pub created_at: Timestamp,
}

impl PoliceStation {
    pub fn covers(&self, postal_code: &str) -> bool {
        self.postal_codes.iter().any(|code| code == postal_code)
    }
}

/// DTO for creating a station. Postal codes must already be normalized.
#[derive(Debug, Clone)]
pub struct CreateStation {
    pub name: String,
    pub city: String,
    pub postal_codes: Vec<PostalCode>,
}
