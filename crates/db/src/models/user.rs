//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use staywatch_core::account::AccountStatus;
use staywatch_core::roles::Role;
use staywatch_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub police_station_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
    pub password_change_required: bool,
    pub hotel_name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub rank: Option<String>,
    pub service_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn is_suspended(&self) -> bool {
        self.status == AccountStatus::Suspended
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub police_station_id: Option<DbId>,
    pub status: AccountStatus,
    pub password_change_required: bool,
    pub hotel_name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub rank: Option<String>,
    pub service_id: Option<String>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            police_station_id: user.police_station_id,
            status: user.status,
            password_change_required: user.password_change_required,
            hotel_name: user.hotel_name.clone(),
            city: user.city.clone(),
            phone: user.phone.clone(),
            rank: user.rank.clone(),
            service_id: user.service_id.clone(),
            created_at: user.created_at,
        }
    }
}

/// Optional profile fields captured at provisioning time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    pub hotel_name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub rank: Option<String>,
    pub service_id: Option<String>,
}

/// Changes a user may make to their own account. `None` leaves the stored
/// value unchanged; `email` must already be normalized.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub email: Option<String>,
    pub profile: UserProfile,
}

/// DTO for creating a new user. `username` and `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub police_station_id: Option<DbId>,
    pub profile: UserProfile,
}

/// Filters for the admin user listing. `None` means "don't filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    /// Case-insensitive substring over username, email, hotel name and city.
    pub search_term: Option<String>,
}
