//! Repository for the `users` table.

use sqlx::PgPool;
use staywatch_core::account::AccountStatus;
use staywatch_core::roles::Role;
use staywatch_core::types::DbId;

use super::contains_pattern;
use crate::models::user::{CreateUser, UpdateProfile, User, UserFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, role, police_station_id, status, \
                       password_change_required, hotel_name, city, phone, rank, service_id, \
                       created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// Duplicate usernames/emails surface as a unique violation on
    /// `uq_users_username` / `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role, police_station_id, \
                                hotel_name, city, phone, rank, service_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .bind(input.police_station_id)
            .bind(input.profile.hotel_name.as_deref())
            .bind(input.profile.city.as_deref())
            .bind(input.profile.phone.as_deref())
            .bind(input.profile.rank.as_deref())
            .bind(input.profile.service_id.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by (normalized) email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users matching `filter`, most recently created first.
    pub async fn list(pool: &PgPool, filter: &UserFilter) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::text IS NULL OR role = $1)
               AND ($2::text IS NULL OR status = $2)
               AND ($3::text IS NULL
                    OR username ILIKE $3 OR email ILIKE $3
                    OR hotel_name ILIKE $3 OR city ILIKE $3)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(filter.role.map(|r| r.as_str()))
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.search_term.as_deref().map(contains_pattern))
            .fetch_all(pool)
            .await
    }

    /// Number of accounts holding `role`.
    pub async fn count_by_role(pool: &PgPool, role: Role) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(pool)
            .await
    }

    /// Apply a self-service profile update. Returns `None` if no row with `id`
    /// exists. A clashing email violates `uq_users_email`.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                 email      = COALESCE($2, email),
                 hotel_name = COALESCE($3, hotel_name),
                 city       = COALESCE($4, city),
                 phone      = COALESCE($5, phone),
                 rank       = COALESCE($6, rank),
                 service_id = COALESCE($7, service_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(input.email.as_deref())
            .bind(input.profile.hotel_name.as_deref())
            .bind(input.profile.city.as_deref())
            .bind(input.profile.phone.as_deref())
            .bind(input.profile.rank.as_deref())
            .bind(input.profile.service_id.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Officers assigned to a station.
    pub async fn list_by_station(pool: &PgPool, station_id: DbId) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE police_station_id = $1 AND role = 'Police'
             ORDER BY id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(station_id)
            .fetch_all(pool)
            .await
    }

    /// Replace the password hash and set the change-required flag.
    ///
    /// Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
        change_required: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, password_change_required = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(change_required)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the account status. Returns `None` if no row with `id` exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: AccountStatus,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
