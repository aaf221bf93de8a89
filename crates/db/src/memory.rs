//! In-process implementation of the store traits.
//!
//! Enforces the same unique constraints and conditional transitions as the
//! PostgreSQL schema, reporting violations with the same constraint names.
//! Used by the HTTP integration tests and for single-process runs.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use staywatch_core::account::AccountStatus;
use staywatch_core::audit::matches_term;
use staywatch_core::guest::{AlertStatus, GuestSearch, GuestStatus, SearchBy};
use staywatch_core::roles::Role;
use staywatch_core::types::{DbId, Timestamp};

use crate::error::{StoreError, StoreResult};
use crate::models::access_log::{AccessLog, CreateAccessLog};
use crate::models::alert::{Alert, AlertDetail, CreateAlert};
use crate::models::guest::{CreateGuest, Guest};
use crate::models::notification::{CreateNotification, Notification};
use crate::models::remark::{CreateRemark, Remark, RemarkDetail};
use crate::models::station::{CreateStation, PoliceStation};
use crate::models::user::{CreateUser, UpdateProfile, User, UserFilter};
use crate::store::{
    AlertStore, AuditLog, CredentialStore, GuestStore, JurisdictionDirectory, NotificationStore,
    RemarkStore,
};

#[derive(Default)]
struct Tables {
    next_id: DbId,
    users: Vec<User>,
    stations: Vec<PoliceStation>,
    guests: Vec<Guest>,
    notifications: Vec<Notification>,
    access_logs: Vec<AccessLog>,
    alerts: Vec<Alert>,
    remarks: Vec<Remark>,
}

impl Tables {
    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn username_of(&self, id: DbId) -> Option<String> {
        self.users.iter().find(|u| u.id == id).map(|u| u.username.clone())
    }

    /// Alerts accepted by `keep`, joined like `AlertRepo`'s detail query, newest first.
    fn alert_details(&self, keep: impl Fn(&Alert) -> bool) -> Vec<AlertDetail> {
        let mut details: Vec<AlertDetail> = self
            .alerts
            .iter()
            .filter(|alert| keep(alert))
            .filter_map(|alert| {
                let guest = self.guests.iter().find(|g| g.id == alert.guest_id)?;
                Some(AlertDetail {
                    alert: alert.clone(),
                    guest_name: guest.name.clone(),
                    guest_customer_id: guest.customer_id.clone(),
                    created_by_username: self.username_of(alert.created_by),
                })
            })
            .collect();
        newest_first(&mut details, |d| (d.alert.created_at, d.alert.id));
        details
    }
}

/// Store backed by vectors behind a mutex. The lock is never held across an await.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }
}

/// Newest first, ties broken by id like the SQL `ORDER BY ..., id DESC`.
fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (Timestamp, DbId)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.username == input.username) {
            return Err(StoreError::Conflict("uq_users_username".into()));
        }
        if tables.users.iter().any(|u| u.email == input.email) {
            return Err(StoreError::Conflict("uq_users_email".into()));
        }
        let now = Utc::now();
        let user = User {
            id: tables.allocate_id(),
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role,
            police_station_id: input.police_station_id,
            status: AccountStatus::Active,
            password_change_required: true,
            hotel_name: input.profile.hotel_name.clone(),
            city: input.profile.city.clone(),
            phone: input.profile.phone.clone(),
            rank: input.profile.rank.clone(),
            service_id: input.profile.service_id.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        let tables = self.lock()?;
        let mut users: Vec<User> = tables
            .users
            .iter()
            .filter(|u| filter.role.map_or(true, |role| u.role == role))
            .filter(|u| filter.status.map_or(true, |status| u.status == status))
            .filter(|u| {
                filter.search_term.as_deref().map_or(true, |term| {
                    [Some(&u.username), Some(&u.email), u.hotel_name.as_ref(), u.city.as_ref()]
                        .into_iter()
                        .flatten()
                        .any(|field| matches_term(field, term))
                })
            })
            .cloned()
            .collect();
        newest_first(&mut users, |u| (u.created_at, u.id));
        Ok(users)
    }

    async fn count_users(&self, role: Role) -> StoreResult<i64> {
        let count = self.lock()?.users.iter().filter(|u| u.role == role).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn update_profile(&self, id: DbId, input: &UpdateProfile) -> StoreResult<Option<User>> {
        let mut tables = self.lock()?;
        if let Some(email) = &input.email {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Conflict("uq_users_email".into()));
            }
        }
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        let profile = &input.profile;
        if let Some(email) = &input.email {
            user.email = email.clone();
        }
        for (field, value) in [
            (&mut user.hotel_name, &profile.hotel_name),
            (&mut user.city, &profile.city),
            (&mut user.phone, &profile.phone),
            (&mut user.rank, &profile.rank),
            (&mut user.service_id, &profile.service_id),
        ] {
            if value.is_some() {
                *field = value.clone();
            }
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_password(
        &self,
        id: DbId,
        password_hash: &str,
        change_required: bool,
    ) -> StoreResult<bool> {
        let mut tables = self.lock()?;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        user.password_hash = password_hash.to_string();
        user.password_change_required = change_required;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_status(&self, id: DbId, status: AccountStatus) -> StoreResult<Option<User>> {
        let mut tables = self.lock()?;
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.status = status;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete_user(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }
        tables.notifications.retain(|n| n.recipient_user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl JurisdictionDirectory for MemoryStore {
    async fn create_station(&self, input: &CreateStation) -> StoreResult<PoliceStation> {
        let mut tables = self.lock()?;
        if tables.stations.iter().any(|s| s.name == input.name) {
            return Err(StoreError::Conflict("uq_police_stations_name".into()));
        }
        let station = PoliceStation {
            id: tables.allocate_id(),
            name: input.name.clone(),
            city: input.city.clone(),
            postal_codes: input.postal_codes.clone(),
            created_at: Utc::now(),
        };
        tables.stations.push(station.clone());
        Ok(station)
    }

    async fn list_stations(&self) -> StoreResult<Vec<PoliceStation>> {
        let mut stations = self.lock()?.stations.clone();
        stations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stations)
    }

    async fn find_station(&self, id: DbId) -> StoreResult<Option<PoliceStation>> {
        Ok(self.lock()?.stations.iter().find(|s| s.id == id).cloned())
    }

    async fn station_for_postal_code(&self, postal_code: &str) -> StoreResult<Option<PoliceStation>> {
        Ok(self
            .lock()?
            .stations
            .iter()
            .filter(|s| s.covers(postal_code))
            .min_by_key(|s| s.id)
            .cloned())
    }

    async fn officers_of(&self, station_id: DbId) -> StoreResult<Vec<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .filter(|u| u.role == Role::Police && u.police_station_id == Some(station_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GuestStore for MemoryStore {
    async fn create_guest(&self, input: &CreateGuest) -> StoreResult<Guest> {
        let mut tables = self.lock()?;
        if tables.guests.iter().any(|g| g.customer_id == input.customer_id) {
            return Err(StoreError::Conflict("uq_guests_customer_id".into()));
        }
        let guest = Guest {
            id: tables.allocate_id(),
            customer_id: input.customer_id.clone(),
            name: input.name.clone(),
            dob: input.dob,
            gender: input.gender,
            phone: input.phone.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            nationality: input.nationality.clone(),
            id_type: input.id_type.clone(),
            id_number: input.id_number.clone(),
            id_image_front_url: input.id_image_front_url.clone(),
            id_image_back_url: input.id_image_back_url.clone(),
            live_photo_url: input.live_photo_url.clone(),
            accompanying_guests: input.accompanying_guests.clone(),
            purpose_of_visit: input.purpose_of_visit.clone(),
            check_in: input.check_in,
            expected_checkout: input.expected_checkout,
            room_number: input.room_number.clone(),
            status: GuestStatus::CheckedIn,
            hotel_id: input.hotel_id,
            registered_at: Utc::now(),
        };
        tables.guests.push(guest.clone());
        Ok(guest)
    }

    async fn find_guest(&self, id: DbId) -> StoreResult<Option<Guest>> {
        Ok(self.lock()?.guests.iter().find(|g| g.id == id).cloned())
    }

    async fn guests_for_hotel(
        &self,
        hotel_id: DbId,
        since: Option<Timestamp>,
    ) -> StoreResult<Vec<Guest>> {
        let mut guests: Vec<Guest> = self
            .lock()?
            .guests
            .iter()
            .filter(|g| g.hotel_id == hotel_id)
            .filter(|g| since.map_or(true, |since| g.registered_at >= since))
            .cloned()
            .collect();
        newest_first(&mut guests, |g| (g.registered_at, g.id));
        Ok(guests)
    }

    async fn count_registered_since(&self, since: Timestamp) -> StoreResult<i64> {
        let count = self
            .lock()?
            .guests
            .iter()
            .filter(|g| g.registered_at >= since)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn search_guests(&self, search: &GuestSearch) -> StoreResult<Vec<Guest>> {
        let query = search.query.as_str();
        let mut guests: Vec<Guest> = self
            .lock()?
            .guests
            .iter()
            .filter(|g| match search.search_by {
                SearchBy::Name => matches_term(&g.name, query),
                SearchBy::Phone => matches_term(&g.phone, query),
                SearchBy::Id => g.customer_id == query || matches_term(&g.id_number, query),
            })
            .cloned()
            .collect();
        newest_first(&mut guests, |g| (g.registered_at, g.id));
        Ok(guests)
    }

    async fn stays_by_id_number(&self, id_number: &str) -> StoreResult<Vec<Guest>> {
        let mut stays: Vec<Guest> = self
            .lock()?
            .guests
            .iter()
            .filter(|g| g.id_number == id_number)
            .cloned()
            .collect();
        newest_first(&mut stays, |g| (g.check_in, g.id));
        Ok(stays)
    }

    async fn check_out(&self, id: DbId, hotel_id: DbId) -> StoreResult<Option<Guest>> {
        let mut tables = self.lock()?;
        Ok(tables
            .guests
            .iter_mut()
            .find(|g| g.id == id && g.hotel_id == hotel_id && g.status == GuestStatus::CheckedIn)
            .map(|guest| {
                guest.status = GuestStatus::CheckedOut;
                guest.clone()
            }))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create_notification(&self, input: &CreateNotification) -> StoreResult<Notification> {
        let mut tables = self.lock()?;
        let notification = Notification {
            id: tables.allocate_id(),
            recipient_station_id: input.recipient_station_id,
            recipient_user_id: input.recipient_user_id,
            message: input.message.clone(),
            is_read: false,
            created_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn notifications_for(&self, user_id: DbId, limit: i64) -> StoreResult<Vec<Notification>> {
        let mut inbox: Vec<Notification> = self
            .lock()?
            .notifications
            .iter()
            .filter(|n| n.recipient_user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut inbox, |n| (n.created_at, n.id));
        inbox.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(inbox)
    }

    async fn mark_read(&self, id: DbId, user_id: DbId) -> StoreResult<Option<Notification>> {
        let mut tables = self.lock()?;
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_user_id == user_id)
            .map(|notification| {
                notification.is_read = true;
                notification.clone()
            }))
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn record(&self, entry: &CreateAccessLog) -> StoreResult<AccessLog> {
        let mut tables = self.lock()?;
        let log = AccessLog {
            id: tables.allocate_id(),
            user_id: entry.user_id,
            username: entry.username.clone(),
            action: entry.action.clone(),
            search_query: entry.search_query.clone(),
            reason: entry.reason.clone(),
            created_at: Utc::now(),
        };
        tables.access_logs.push(log.clone());
        Ok(log)
    }

    async fn query(&self, search_term: Option<&str>, limit: i64) -> StoreResult<Vec<AccessLog>> {
        let mut logs: Vec<AccessLog> = self
            .lock()?
            .access_logs
            .iter()
            .filter(|log| {
                search_term.map_or(true, |term| {
                    matches_term(&log.username, term)
                        || matches_term(&log.action, term)
                        || matches_term(&log.reason, term)
                        || log.search_query.as_deref().is_some_and(|q| matches_term(q, term))
                })
            })
            .cloned()
            .collect();
        newest_first(&mut logs, |log| (log.created_at, log.id));
        logs.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(logs)
    }

    async fn count_since(&self, action: &str, since: Timestamp) -> StoreResult<i64> {
        let count = self
            .lock()?
            .access_logs
            .iter()
            .filter(|log| log.action == action && log.created_at >= since)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn create_alert(&self, input: &CreateAlert) -> StoreResult<Alert> {
        let mut tables = self.lock()?;
        let now = Utc::now();
        let alert = Alert {
            id: tables.allocate_id(),
            guest_id: input.guest_id,
            created_by: input.created_by,
            reason: input.reason.clone(),
            status: AlertStatus::Open,
            created_at: now,
            updated_at: now,
        };
        tables.alerts.push(alert.clone());
        Ok(alert)
    }

    async fn find_alert(&self, id: DbId) -> StoreResult<Option<Alert>> {
        Ok(self.lock()?.alerts.iter().find(|a| a.id == id).cloned())
    }

    async fn list_alerts(&self) -> StoreResult<Vec<AlertDetail>> {
        Ok(self.lock()?.alert_details(|_| true))
    }

    async fn open_alerts(&self, limit: i64) -> StoreResult<Vec<AlertDetail>> {
        let mut details = self.lock()?.alert_details(|a| a.status == AlertStatus::Open);
        details.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(details)
    }

    async fn alerts_for_guests(&self, guest_ids: &[DbId]) -> StoreResult<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .lock()?
            .alerts
            .iter()
            .filter(|a| guest_ids.contains(&a.guest_id))
            .cloned()
            .collect();
        newest_first(&mut alerts, |a| (a.created_at, a.id));
        Ok(alerts)
    }

    async fn resolve_alert(&self, id: DbId) -> StoreResult<Option<Alert>> {
        let mut tables = self.lock()?;
        Ok(tables
            .alerts
            .iter_mut()
            .find(|a| a.id == id && a.status == AlertStatus::Open)
            .map(|alert| {
                alert.status = AlertStatus::Resolved;
                alert.updated_at = Utc::now();
                alert.clone()
            }))
    }
}

#[async_trait]
impl RemarkStore for MemoryStore {
    async fn create_remark(&self, input: &CreateRemark) -> StoreResult<RemarkDetail> {
        let mut tables = self.lock()?;
        let remark = Remark {
            id: tables.allocate_id(),
            guest_id: input.guest_id,
            officer_id: input.officer_id,
            text: input.text.clone(),
            created_at: Utc::now(),
        };
        tables.remarks.push(remark.clone());
        Ok(RemarkDetail {
            officer_username: tables.username_of(remark.officer_id),
            remark,
        })
    }

    async fn remarks_for_guests(&self, guest_ids: &[DbId]) -> StoreResult<Vec<RemarkDetail>> {
        let tables = self.lock()?;
        let mut remarks: Vec<RemarkDetail> = tables
            .remarks
            .iter()
            .filter(|r| guest_ids.contains(&r.guest_id))
            .map(|r| RemarkDetail {
                remark: r.clone(),
                officer_username: tables.username_of(r.officer_id),
            })
            .collect();
        newest_first(&mut remarks, |r| (r.remark.created_at, r.remark.id));
        Ok(remarks)
    }
}
