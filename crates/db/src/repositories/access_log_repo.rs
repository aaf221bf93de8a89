//! Repository for the append-only `access_logs` table.
//!
//! Only INSERT and SELECT are issued; a trigger rejects any UPDATE or DELETE.

use sqlx::PgPool;
use staywatch_core::types::Timestamp;

use super::contains_pattern;
use crate::models::access_log::{AccessLog, CreateAccessLog};

const COLUMNS: &str = "id, user_id, username, action, search_query, reason, created_at";

pub struct AccessLogRepo;

impl AccessLogRepo {
    /// Append an entry.
    pub async fn create(pool: &PgPool, input: &CreateAccessLog) -> Result<AccessLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO access_logs (user_id, username, action, search_query, reason)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccessLog>(&query)
            .bind(input.user_id)
            .bind(&input.username)
            .bind(&input.action)
            .bind(input.search_query.as_deref())
            .bind(&input.reason)
            .fetch_one(pool)
            .await
    }

    /// Newest entries first, optionally filtered by a case-insensitive term
    /// across username, action, reason and search query.
    pub async fn list(
        pool: &PgPool,
        search_term: Option<&str>,
        limit: i64,
    ) -> Result<Vec<AccessLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM access_logs
             WHERE $1::text IS NULL
                OR username ILIKE $1 OR action ILIKE $1
                OR reason ILIKE $1 OR search_query ILIKE $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, AccessLog>(&query)
            .bind(search_term.map(contains_pattern))
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Number of `action` entries written at or after `since`.
    pub async fn count_since(
        pool: &PgPool,
        action: &str,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM access_logs WHERE action = $1 AND created_at >= $2")
            .bind(action)
            .bind(since)
            .fetch_one(pool)
            .await
    }
}
