//! Repository for the `alerts` table.

use sqlx::PgPool;
use staywatch_core::guest::AlertStatus;
use staywatch_core::types::DbId;

use crate::models::alert::{Alert, AlertDetail, CreateAlert};

const COLUMNS: &str = "id, guest_id, created_by, reason, status, created_at, updated_at";

/// Alerts joined with the flagged guest and the raising officer.
const DETAIL_SELECT: &str =
    "SELECT a.id, a.guest_id, a.created_by, a.reason, a.status, a.created_at, a.updated_at,
            g.name AS guest_name, g.customer_id AS guest_customer_id,
            u.username AS created_by_username
     FROM alerts a
     JOIN guests g ON g.id = a.guest_id
     LEFT JOIN users u ON u.id = a.created_by";

pub struct AlertRepo;

impl AlertRepo {
    pub async fn create(pool: &PgPool, input: &CreateAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts (guest_id, created_by, reason)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.guest_id)
            .bind(input.created_by)
            .bind(&input.reason)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every alert with guest and officer names, newest first.
    pub async fn list_detailed(pool: &PgPool) -> Result<Vec<AlertDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} ORDER BY a.created_at DESC, a.id DESC");
        sqlx::query_as::<_, AlertDetail>(&query).fetch_all(pool).await
    }

    /// The most recent open alerts, newest first.
    pub async fn list_open_detailed(pool: &PgPool, limit: i64) -> Result<Vec<AlertDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE a.status = $1
             ORDER BY a.created_at DESC, a.id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, AlertDetail>(&query)
            .bind(AlertStatus::Open.as_str())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Alerts raised against any of the given stays, newest first.
    pub async fn list_for_guests(pool: &PgPool, guest_ids: &[DbId]) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts WHERE guest_id = ANY($1) ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(guest_ids)
            .fetch_all(pool)
            .await
    }

    /// Resolve an open alert. Returns `None` when it was not open.
    pub async fn resolve(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET status = $2 WHERE id = $1 AND status = $3 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(AlertStatus::Resolved.as_str())
            .bind(AlertStatus::Open.as_str())
            .fetch_optional(pool)
            .await
    }
}
