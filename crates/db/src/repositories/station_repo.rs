//! Repository for the `police_stations` table.

use sqlx::PgPool;
use staywatch_core::types::DbId;

use crate::models::station::{CreateStation, PoliceStation};

const COLUMNS: &str = "id, name, city, postal_codes, created_at";

/// Station CRUD and postal-code lookup.
pub struct StationRepo;

impl StationRepo {
    /// Insert a station. Duplicate names violate `uq_police_stations_name`.
    pub async fn create(pool: &PgPool, input: &CreateStation) -> Result<PoliceStation, sqlx::Error> {
        let query = format!(
            "INSERT INTO police_stations (name, city, postal_codes)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PoliceStation>(&query)
            .bind(&input.name)
            .bind(&input.city)
            .bind(&input.postal_codes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PoliceStation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM police_stations WHERE id = $1");
        sqlx::query_as::<_, PoliceStation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all stations by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<PoliceStation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM police_stations ORDER BY name");
        sqlx::query_as::<_, PoliceStation>(&query).fetch_all(pool).await
    }

    /// The station whose jurisdiction contains `postal_code`.
    ///
    /// If several stations list the same code, the lowest id wins.
    pub async fn find_by_postal_code(
        pool: &PgPool,
        postal_code: &str,
    ) -> Result<Option<PoliceStation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM police_stations
             WHERE $1 = ANY(postal_codes)
             ORDER BY id
             LIMIT 1"
        );
        sqlx::query_as::<_, PoliceStation>(&query)
            .bind(postal_code)
            .fetch_optional(pool)
            .await
    }
}
