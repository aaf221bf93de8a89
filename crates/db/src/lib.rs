//! StayWatch persistence layer.
//!
//! - [`models`] -- row structs and create/filter DTOs.
//! - [`repositories`] -- zero-sized `*Repo` structs issuing SQL against `&PgPool`.
//! - [`store`] -- the store traits the service layer depends on.
//! - [`pg`] / [`memory`] -- PostgreSQL and in-process implementations of those traits.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::Stores;

pub type DbPool = sqlx::PgPool;

/// Maximum number of pooled PostgreSQL connections.
const MAX_CONNECTIONS: u32 = 20;

/// Create a connection pool from a database URL.
///
/// `acquire_timeout` bounds how long a request may wait for a connection;
/// on expiry the query fails with [`StoreError::Unavailable`] instead of hanging.
pub async fn create_pool(database_url: &str, acquire_timeout: Duration) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database answers.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
