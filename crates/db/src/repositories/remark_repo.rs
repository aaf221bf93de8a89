//! Repository for the `remarks` table.

use sqlx::PgPool;
use staywatch_core::types::DbId;

use crate::models::remark::{CreateRemark, RemarkDetail};

/// Columns of a remark aliased `r` joined with its officer aliased `u`.
const DETAIL_COLUMNS: &str =
    "r.id, r.guest_id, r.officer_id, r.text, r.created_at, u.username AS officer_username";

pub struct RemarkRepo;

impl RemarkRepo {
    /// Insert a remark and return it with the officer's username.
    pub async fn create(pool: &PgPool, input: &CreateRemark) -> Result<RemarkDetail, sqlx::Error> {
        let query = format!(
            "WITH r AS (
                 INSERT INTO remarks (guest_id, officer_id, text)
                 VALUES ($1, $2, $3)
                 RETURNING id, guest_id, officer_id, text, created_at
             )
             SELECT {DETAIL_COLUMNS} FROM r LEFT JOIN users u ON u.id = r.officer_id"
        );
        sqlx::query_as::<_, RemarkDetail>(&query)
            .bind(input.guest_id)
            .bind(input.officer_id)
            .bind(&input.text)
            .fetch_one(pool)
            .await
    }

    /// Remarks on any of the given stays, newest first.
    pub async fn list_for_guests(
        pool: &PgPool,
        guest_ids: &[DbId],
    ) -> Result<Vec<RemarkDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM remarks r
             LEFT JOIN users u ON u.id = r.officer_id
             WHERE r.guest_id = ANY($1)
             ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, RemarkDetail>(&query)
            .bind(guest_ids)
            .fetch_all(pool)
            .await
    }
}
