//! Handlers for the `/police` resource: guest search with cross-jurisdiction
//! notification, the dashboard, alerts, remarks and stay history.
//!
//! All handlers require the `Police` role.

use std::collections::{BTreeMap, HashMap};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use staywatch_core::audit::{action_types, alert_reason};
use staywatch_core::error::CoreError;
use staywatch_core::guest::{ensure_can_resolve, normalize_remark, GuestSearch, ALREADY_RESOLVED};
use staywatch_core::jurisdiction::{
    cross_jurisdiction_message, cross_jurisdiction_target, postal_code_from_address,
    JurisdictionHit,
};
use staywatch_core::roles::Role;
use staywatch_core::types::{start_of_day, DbId, PostalCode};
use staywatch_db::models::access_log::CreateAccessLog;
use staywatch_db::models::alert::{Alert, AlertDetail, CreateAlert};
use staywatch_db::models::guest::Guest;
use staywatch_db::models::notification::CreateNotification;
use staywatch_db::models::remark::{CreateRemark, RemarkDetail};
use staywatch_db::models::user::User;
use staywatch_db::StoreResult;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{PoliceOnly, RequireRole};
use crate::response::{ApiJson, ApiPath, DataResponse, MessageResponse};
use crate::state::AppState;

/// Station name used in messages when the searching officer has none.
const UNASSIGNED_STATION: &str = "an unassigned station";

/// Open alerts shown on the dashboard.
const DASHBOARD_ALERTS: i64 = 5;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /police/search`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    pub search_by: String,
    pub reason: String,
}

/// Request body for `POST /police/alerts`.
#[derive(Debug, Deserialize)]
pub struct CreateAlertRequest {
    pub guest_id: Option<DbId>,
    pub reason: Option<String>,
}

/// Request body for `POST /police/guests/{id}/remarks`.
#[derive(Debug, Deserialize)]
pub struct CreateRemarkRequest {
    pub text: Option<String>,
}

/// Response for `GET /police/guests/{id}/history`.
#[derive(Debug, Serialize)]
pub struct GuestHistory {
    pub primary_guest: Guest,
    /// Every stay sharing the primary guest's id number, newest check-in first.
    pub stay_history: Vec<Guest>,
    pub alerts: Vec<Alert>,
    /// Remarks on any of those stays, newest first.
    pub remarks: Vec<RemarkDetail>,
}

/// Response for `GET /police/dashboard`.
#[derive(Debug, Serialize)]
pub struct PoliceDashboard {
    pub total_hotels: i64,
    /// Stays registered since midnight UTC, across all hotels.
    pub guests_today: i64,
    /// The most recent open alerts.
    pub alerts: Vec<AlertDetail>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/police/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireRole(_officer, _): RequireRole<PoliceOnly>,
) -> AppResult<Json<DataResponse<PoliceDashboard>>> {
    let since = start_of_day(chrono::Utc::now());
    let (total_hotels, guests_today, alerts) = futures::try_join!(
        state.stores.credentials.count_users(Role::Hotel),
        state.stores.guests.count_registered_since(since),
        state.stores.alerts.open_alerts(DASHBOARD_ALERTS),
    )?;

    Ok(Json(DataResponse {
        data: PoliceDashboard {
            total_hotels,
            guests_today,
            alerts,
        },
    }))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// POST /api/v1/police/search
///
/// The access-log entry is written before the lookup and stands whether or
/// not anything matches. Notifying other jurisdictions is best-effort.
pub async fn search_guests(
    State(state): State<AppState>,
    RequireRole(auth, _): RequireRole<PoliceOnly>,
    ApiJson(input): ApiJson<SearchRequest>,
) -> AppResult<Json<DataResponse<Vec<Guest>>>> {
    let search = GuestSearch::parse(&input.query, &input.search_by, &input.reason)?;
    let officer = auth.user;

    state
        .stores
        .audit
        .record(&CreateAccessLog {
            user_id: officer.id,
            username: officer.username.clone(),
            action: action_types::GUEST_SEARCH.into(),
            search_query: Some(search.audit_query()),
            reason: search.reason.clone(),
        })
        .await?;

    let guests = state.stores.guests.search_guests(&search).await?;
    tracing::info!(
        officer_id = officer.id,
        search_by = %search.search_by,
        matches = guests.len(),
        "Guest search",
    );
    if guests.is_empty() {
        return Err(AppError::Core(CoreError::Missing(
            "no guests matched the search".into(),
        )));
    }

    match notify_other_jurisdictions(&state, &officer, &guests).await {
        Ok(sent) if sent > 0 => {
            tracing::info!(officer_id = officer.id, sent, "Cross-jurisdiction notifications sent");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(officer_id = officer.id, error = %e, "Cross-jurisdiction notification failed");
        }
    }

    Ok(Json(DataResponse { data: guests }))
}

/// Notify every officer of each station, other than the searcher's own,
/// whose jurisdiction covers a matched guest's postal code.
///
/// Matches are grouped by target station, so each officer receives one
/// notification per search however many stays matched. Only failing to
/// resolve the searcher's own station aborts; a failed lookup for one guest
/// or station, or a failed insert for one officer, is logged and skipped.
/// Returns the number delivered.
async fn notify_other_jurisdictions(
    state: &AppState,
    officer: &User,
    guests: &[Guest],
) -> StoreResult<usize> {
    let directory = &state.stores.directory;

    let own_station = match officer.police_station_id {
        Some(id) => directory.find_station(id).await?,
        None => None,
    };
    let own_station_id = own_station.as_ref().map(|s| s.id);
    let own_station_name = own_station
        .as_ref()
        .map_or(UNASSIGNED_STATION, |s| s.name.as_str());

    let mut owners: HashMap<PostalCode, Option<DbId>> = HashMap::new();
    let mut hits_by_station: BTreeMap<DbId, Vec<JurisdictionHit>> = BTreeMap::new();
    for guest in guests {
        let Some(postal_code) = postal_code_from_address(&guest.address) else {
            continue;
        };
        let owner = match owners.get(&postal_code) {
            Some(owner) => *owner,
            None => match directory.station_for_postal_code(&postal_code).await {
                Ok(station) => {
                    let owner = station.map(|s| s.id);
                    owners.insert(postal_code.clone(), owner);
                    owner
                }
                Err(e) => {
                    tracing::warn!(guest_id = guest.id, %postal_code, error = %e, "Jurisdiction lookup failed");
                    continue;
                }
            },
        };
        if let Some(target_id) = cross_jurisdiction_target(own_station_id, owner) {
            hits_by_station.entry(target_id).or_default().push(JurisdictionHit {
                guest_name: guest.name.clone(),
                postal_code,
            });
        }
    }

    let mut delivered = 0;
    for (target_id, hits) in hits_by_station {
        let recipients = match directory.officers_of(target_id).await {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::warn!(station_id = target_id, error = %e, "Officer lookup failed");
                continue;
            }
        };
        let message = cross_jurisdiction_message(&officer.username, own_station_name, &hits);
        let inserts = recipients.iter().map(|recipient| {
            let notifications = state.stores.notifications.clone();
            let input = CreateNotification {
                recipient_station_id: target_id,
                recipient_user_id: recipient.id,
                message: message.clone(),
            };
            async move { notifications.create_notification(&input).await }
        });

        for (recipient, result) in recipients.iter().zip(join_all(inserts).await) {
            match result {
                Ok(_) => delivered += 1,
                Err(e) => tracing::warn!(
                    recipient_id = recipient.id,
                    station_id = target_id,
                    error = %e,
                    "Notification insert failed",
                ),
            }
        }
    }
    Ok(delivered)
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// POST /api/v1/police/alerts
pub async fn create_alert(
    State(state): State<AppState>,
    RequireRole(auth, _): RequireRole<PoliceOnly>,
    ApiJson(input): ApiJson<CreateAlertRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse<Alert>>)> {
    let reason = input
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());
    let (Some(guest_id), Some(reason)) = (input.guest_id, reason) else {
        return Err(AppError::Core(CoreError::Validation(
            "guest id and reason are required".into(),
        )));
    };

    let guest = state
        .stores
        .guests
        .find_guest(guest_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "guest",
            id: guest_id,
        })?;

    let officer = auth.user;
    let alert = state
        .stores
        .alerts
        .create_alert(&CreateAlert {
            guest_id,
            created_by: officer.id,
            reason: reason.to_string(),
        })
        .await?;

    state
        .stores
        .audit
        .record(&CreateAccessLog {
            user_id: officer.id,
            username: officer.username.clone(),
            action: action_types::ALERT_CREATED.into(),
            search_query: None,
            reason: alert_reason(&guest.name, reason),
        })
        .await?;

    tracing::info!(officer_id = officer.id, guest_id, alert_id = alert.id, "Alert created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            data: alert,
            message: "alert created successfully",
        }),
    ))
}

/// GET /api/v1/police/alerts
///
/// Newest first, with the flagged guest and raising officer resolved.
pub async fn list_alerts(
    State(state): State<AppState>,
    RequireRole(_officer, _): RequireRole<PoliceOnly>,
) -> AppResult<Json<DataResponse<Vec<AlertDetail>>>> {
    let alerts = state.stores.alerts.list_alerts().await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// PUT /api/v1/police/alerts/{id}/resolve
pub async fn resolve_alert(
    State(state): State<AppState>,
    RequireRole(auth, _): RequireRole<PoliceOnly>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<MessageResponse<Alert>>> {
    let alert = state
        .stores
        .alerts
        .find_alert(id)
        .await?
        .ok_or(CoreError::NotFound { entity: "alert", id })?;
    ensure_can_resolve(alert.status)?;

    let Some(resolved) = state.stores.alerts.resolve_alert(id).await? else {
        // Resolved concurrently between the read and the update.
        return Err(AppError::Core(CoreError::Validation(ALREADY_RESOLVED.into())));
    };

    tracing::info!(officer_id = auth.user.id, alert_id = id, "Alert resolved");

    Ok(Json(MessageResponse {
        data: resolved,
        message: "alert resolved",
    }))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// GET /api/v1/police/guests/{id}/history
pub async fn guest_history(
    State(state): State<AppState>,
    RequireRole(_officer, _): RequireRole<PoliceOnly>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<GuestHistory>>> {
    let primary_guest = state
        .stores
        .guests
        .find_guest(id)
        .await?
        .ok_or(CoreError::NotFound { entity: "guest", id })?;

    let stay_history = state
        .stores
        .guests
        .stays_by_id_number(&primary_guest.id_number)
        .await?;
    let stay_ids: Vec<DbId> = stay_history.iter().map(|g| g.id).collect();
    let (alerts, remarks) = futures::try_join!(
        state.stores.alerts.alerts_for_guests(&stay_ids),
        state.stores.remarks.remarks_for_guests(&stay_ids),
    )?;

    Ok(Json(DataResponse {
        data: GuestHistory {
            primary_guest,
            stay_history,
            alerts,
            remarks,
        },
    }))
}

/// POST /api/v1/police/guests/{id}/remarks
pub async fn add_remark(
    State(state): State<AppState>,
    RequireRole(auth, _): RequireRole<PoliceOnly>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<CreateRemarkRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse<RemarkDetail>>)> {
    let text = normalize_remark(input.text.as_deref())?;
    if state.stores.guests.find_guest(id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound { entity: "guest", id }));
    }

    let remark = state
        .stores
        .remarks
        .create_remark(&CreateRemark {
            guest_id: id,
            officer_id: auth.user.id,
            text,
        })
        .await?;

    tracing::info!(officer_id = auth.user.id, guest_id = id, remark_id = remark.remark.id, "Remark added");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            data: remark,
            message: "remark added",
        }),
    ))
}
