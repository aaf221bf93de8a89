//! Repository for the `notifications` table.

use sqlx::PgPool;
use staywatch_core::types::DbId;

use crate::models::notification::{CreateNotification, Notification};

const COLUMNS: &str = "id, recipient_station_id, recipient_user_id, message, is_read, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(pool: &PgPool, input: &CreateNotification) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (recipient_station_id, recipient_user_id, message)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.recipient_station_id)
            .bind(input.recipient_user_id)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// Most recent notifications addressed to a user.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE recipient_user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark a notification read on behalf of its recipient.
    ///
    /// Returns `None` if it does not exist or belongs to someone else.
    pub async fn mark_read(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications SET is_read = TRUE
             WHERE id = $1 AND recipient_user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
