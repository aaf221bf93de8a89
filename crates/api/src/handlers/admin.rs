//! Handlers for the `/admin` resource: the dashboard, accounts, police
//! stations and the access log.
//!
//! All handlers require the `RegionalAdmin` role via [`RequireRole<AdminOnly>`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use staywatch_core::account::{
    generate_temporary_password, normalize_email, normalize_username, AccountStatus,
};
use staywatch_core::audit::{action_types, MAX_QUERY_ROWS};
use staywatch_core::error::CoreError;
use staywatch_core::jurisdiction::{normalize_postal_codes, split_postal_codes};
use staywatch_core::roles::Role;
use staywatch_core::types::{start_of_day, DbId};
use staywatch_db::models::access_log::AccessLog;
use staywatch_db::models::station::{CreateStation, PoliceStation};
use staywatch_db::models::user::{CreateUser, User, UserFilter, UserProfile, UserResponse};

use super::internal;
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{AdminOnly, RequireRole};
use crate::response::{ApiJson, ApiPath, ApiQuery, DataResponse, MessageResponse};
use crate::state::AppState;
use crate::tasks::spawn_best_effort;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub police_station_id: Option<DbId>,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Request body for `PUT /admin/users/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AccountStatus,
}

/// Postal codes as a JSON list or a comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PostalCodesInput {
    List(Vec<String>),
    Csv(String),
}

/// Request body for `POST /admin/stations`.
#[derive(Debug, Deserialize)]
pub struct CreateStationRequest {
    pub name: String,
    pub city: String,
    pub postal_codes: PostalCodesInput,
}

/// Query parameters for `GET /admin/access-logs`.
#[derive(Debug, Default, Deserialize)]
pub struct AccessLogQuery {
    pub search_term: Option<String>,
}

/// Accounts shown per role on the dashboard.
const DASHBOARD_RECENT_USERS: usize = 5;

/// Counters on the admin dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub hotels: i64,
    pub police: i64,
    /// Stays registered since midnight UTC.
    pub guests_today: i64,
    /// Guest searches audited since midnight UTC.
    pub searches_today: i64,
}

/// Most recently provisioned accounts per role.
#[derive(Debug, Serialize)]
pub struct RecentUsers {
    pub hotels: Vec<UserResponse>,
    pub police: Vec<UserResponse>,
}

/// Response for `GET /admin/dashboard`.
#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub metrics: DashboardMetrics,
    pub users: RecentUsers,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireRole(_admin, _): RequireRole<AdminOnly>,
) -> AppResult<Json<DataResponse<AdminDashboard>>> {
    let since = start_of_day(chrono::Utc::now());
    let credentials = &state.stores.credentials;
    let hotel_filter = UserFilter {
        role: Some(Role::Hotel),
        ..UserFilter::default()
    };
    let police_filter = UserFilter {
        role: Some(Role::Police),
        ..UserFilter::default()
    };

    let (hotels, police, guests_today, searches_today, recent_hotels, recent_police) =
        futures::try_join!(
            credentials.count_users(Role::Hotel),
            credentials.count_users(Role::Police),
            state.stores.guests.count_registered_since(since),
            state.stores.audit.count_since(action_types::GUEST_SEARCH, since),
            credentials.list_users(&hotel_filter),
            credentials.list_users(&police_filter),
        )?;

    Ok(Json(DataResponse {
        data: AdminDashboard {
            metrics: DashboardMetrics {
                hotels,
                police,
                guests_today,
                searches_today,
            },
            users: RecentUsers {
                hotels: most_recent(&recent_hotels),
                police: most_recent(&recent_police),
            },
        },
    }))
}

/// The newest accounts of a listing that is already ordered newest first.
fn most_recent(users: &[User]) -> Vec<UserResponse> {
    users
        .iter()
        .take(DASHBOARD_RECENT_USERS)
        .map(UserResponse::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
///
/// Provision an account with a random temporary password. The credentials
/// mail is sent after the row is committed; a mail failure is only logged.
pub async fn create_user(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireRole<AdminOnly>,
    ApiJson(input): ApiJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse<UserResponse>>)> {
    let username = normalize_username(&input.username)?;
    let email = normalize_email(&input.email)?;

    let police_station_id = if input.role.requires_station() {
        let station_id = input.police_station_id.ok_or_else(|| {
            CoreError::Validation("a police station is required for police accounts".into())
        })?;
        if state.stores.directory.find_station(station_id).await?.is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "police station {station_id} does not exist"
            ))));
        }
        Some(station_id)
    } else {
        None
    };

    let temporary_password = generate_temporary_password();
    let password_hash =
        hash_password(&temporary_password).map_err(|e| internal("Password hashing error", e))?;

    let user = state
        .stores
        .credentials
        .create_user(&CreateUser {
            username,
            email,
            password_hash,
            role: input.role,
            police_station_id,
            profile: input.profile,
        })
        .await?;

    tracing::info!(
        admin_id = admin.user.id,
        user_id = user.id,
        role = %user.role,
        "User provisioned",
    );

    let mailer = state.mailer.clone();
    let (email, username) = (user.email.clone(), user.username.clone());
    spawn_best_effort("credentials_mail", async move {
        mailer
            .send_credentials(&email, &username, &temporary_password)
            .await
    });

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            data: UserResponse::from(&user),
            message: "user created successfully, credentials have been emailed",
        }),
    ))
}

/// GET /api/v1/admin/users?role=&status=&search_term=
pub async fn list_users(
    State(state): State<AppState>,
    RequireRole(_admin, _): RequireRole<AdminOnly>,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = state.stores.credentials.list_users(&filter).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// PUT /api/v1/admin/users/{id}/status
///
/// Suspension takes effect on the account's next request.
pub async fn update_user_status(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireRole<AdminOnly>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateStatusRequest>,
) -> AppResult<Json<MessageResponse<UserResponse>>> {
    let user = state
        .stores
        .credentials
        .set_status(id, input.status)
        .await?
        .ok_or(CoreError::NotFound { entity: "user", id })?;

    tracing::info!(admin_id = admin.user.id, user_id = id, status = %input.status, "User status updated");

    Ok(Json(MessageResponse {
        data: UserResponse::from(&user),
        message: "user status updated",
    }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Outstanding tokens of the deleted account stop working immediately
/// because the gate can no longer find the user.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireRole<AdminOnly>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<MessageResponse<()>>> {
    if !state.stores.credentials.delete_user(id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "user", id }));
    }

    tracing::info!(admin_id = admin.user.id, user_id = id, "User deleted");

    Ok(Json(MessageResponse {
        data: (),
        message: "user removed successfully",
    }))
}

// ---------------------------------------------------------------------------
// Police stations
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/stations
pub async fn create_station(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireRole<AdminOnly>,
    ApiJson(input): ApiJson<CreateStationRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse<PoliceStation>>)> {
    let name = input.name.trim();
    let city = input.city.trim();
    if name.is_empty() || city.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name, city, and at least one postal code are required".into(),
        )));
    }
    let postal_codes = match &input.postal_codes {
        PostalCodesInput::List(codes) => normalize_postal_codes(codes)?,
        PostalCodesInput::Csv(raw) => split_postal_codes(raw)?,
    };

    let station = state
        .stores
        .directory
        .create_station(&CreateStation {
            name: name.to_string(),
            city: city.to_string(),
            postal_codes,
        })
        .await?;

    tracing::info!(admin_id = admin.user.id, station_id = station.id, name = %station.name, "Police station created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            data: station,
            message: "police station created successfully",
        }),
    ))
}

/// GET /api/v1/admin/stations
pub async fn list_stations(
    State(state): State<AppState>,
    RequireRole(_admin, _): RequireRole<AdminOnly>,
) -> AppResult<Json<DataResponse<Vec<PoliceStation>>>> {
    let stations = state.stores.directory.list_stations().await?;
    Ok(Json(DataResponse { data: stations }))
}

// ---------------------------------------------------------------------------
// Access log
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/access-logs?search_term=
///
/// Newest first, at most [`MAX_QUERY_ROWS`] entries.
pub async fn list_access_logs(
    State(state): State<AppState>,
    RequireRole(_admin, _): RequireRole<AdminOnly>,
    ApiQuery(params): ApiQuery<AccessLogQuery>,
) -> AppResult<Json<DataResponse<Vec<AccessLog>>>> {
    let term = params
        .search_term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let logs = state.stores.audit.query(term, MAX_QUERY_ROWS).await?;
    Ok(Json(DataResponse { data: logs }))
}
