//! Store traits consumed by the HTTP layer.
//!
//! Handlers depend on these object-safe traits rather than on a concrete
//! pool, so the same code runs against PostgreSQL ([`crate::pg::PgStore`])
//! or an in-process store ([`crate::memory::MemoryStore`]).

use std::sync::Arc;

use async_trait::async_trait;
use staywatch_core::account::AccountStatus;
use staywatch_core::guest::GuestSearch;
use staywatch_core::roles::Role;
use staywatch_core::types::{DbId, Timestamp};

use crate::error::StoreResult;
use crate::memory::MemoryStore;
use crate::models::access_log::{AccessLog, CreateAccessLog};
use crate::models::alert::{Alert, AlertDetail, CreateAlert};
use crate::models::guest::{CreateGuest, Guest};
use crate::models::notification::{CreateNotification, Notification};
use crate::models::remark::{CreateRemark, RemarkDetail};
use crate::models::station::{CreateStation, PoliceStation};
use crate::models::user::{CreateUser, UpdateProfile, User, UserFilter};
use crate::pg::PgStore;
use crate::DbPool;

/// User identity, role, password hash and status.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Confirm the backing store answers.
    async fn ping(&self) -> StoreResult<()>;

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;

    /// Lookup by normalized email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>>;

    async fn count_users(&self, role: Role) -> StoreResult<i64>;

    /// `None` if the user does not exist.
    async fn update_profile(&self, id: DbId, input: &UpdateProfile) -> StoreResult<Option<User>>;

    /// Returns `false` if the user does not exist.
    async fn update_password(
        &self,
        id: DbId,
        password_hash: &str,
        change_required: bool,
    ) -> StoreResult<bool>;

    async fn set_status(&self, id: DbId, status: AccountStatus) -> StoreResult<Option<User>>;

    /// Returns `false` if the user does not exist.
    async fn delete_user(&self, id: DbId) -> StoreResult<bool>;
}

/// Postal code to station, station to officers.
#[async_trait]
pub trait JurisdictionDirectory: Send + Sync {
    async fn create_station(&self, input: &CreateStation) -> StoreResult<PoliceStation>;

    async fn list_stations(&self) -> StoreResult<Vec<PoliceStation>>;

    async fn find_station(&self, id: DbId) -> StoreResult<Option<PoliceStation>>;

    /// The station owning `postal_code`; the lowest id when several do.
    async fn station_for_postal_code(&self, postal_code: &str) -> StoreResult<Option<PoliceStation>>;

    /// Police users currently assigned to `station_id`.
    async fn officers_of(&self, station_id: DbId) -> StoreResult<Vec<User>>;
}

/// Guest stays.
#[async_trait]
pub trait GuestStore: Send + Sync {
    async fn create_guest(&self, input: &CreateGuest) -> StoreResult<Guest>;

    async fn find_guest(&self, id: DbId) -> StoreResult<Option<Guest>>;

    /// A hotel's stays, newest first; `since` restricts to recent registrations.
    async fn guests_for_hotel(
        &self,
        hotel_id: DbId,
        since: Option<Timestamp>,
    ) -> StoreResult<Vec<Guest>>;

    /// Stays registered at or after `since`, across all hotels.
    async fn count_registered_since(&self, since: Timestamp) -> StoreResult<i64>;

    async fn search_guests(&self, search: &GuestSearch) -> StoreResult<Vec<Guest>>;

    /// Stays sharing an identity document number, newest check-in first.
    async fn stays_by_id_number(&self, id_number: &str) -> StoreResult<Vec<Guest>>;

    /// `CheckedIn -> CheckedOut`, conditional on the current status and the
    /// owning hotel. `None` means no transition happened.
    async fn check_out(&self, id: DbId, hotel_id: DbId) -> StoreResult<Option<Guest>>;
}

/// Police notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_notification(&self, input: &CreateNotification) -> StoreResult<Notification>;

    async fn notifications_for(&self, user_id: DbId, limit: i64) -> StoreResult<Vec<Notification>>;

    /// `None` unless `user_id` is the recipient.
    async fn mark_read(&self, id: DbId, user_id: DbId) -> StoreResult<Option<Notification>>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: &CreateAccessLog) -> StoreResult<AccessLog>;

    /// Newest first, filtered case-insensitively, at most `limit` rows.
    async fn query(&self, search_term: Option<&str>, limit: i64) -> StoreResult<Vec<AccessLog>>;

    /// Entries of `action` written at or after `since`.
    async fn count_since(&self, action: &str, since: Timestamp) -> StoreResult<i64>;
}

/// Police alerts on guest stays.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn create_alert(&self, input: &CreateAlert) -> StoreResult<Alert>;

    async fn find_alert(&self, id: DbId) -> StoreResult<Option<Alert>>;

    async fn list_alerts(&self) -> StoreResult<Vec<AlertDetail>>;

    /// The `limit` most recent open alerts, newest first.
    async fn open_alerts(&self, limit: i64) -> StoreResult<Vec<AlertDetail>>;

    async fn alerts_for_guests(&self, guest_ids: &[DbId]) -> StoreResult<Vec<Alert>>;

    /// `Open -> Resolved`. `None` means the alert was not open.
    async fn resolve_alert(&self, id: DbId) -> StoreResult<Option<Alert>>;
}

/// Officer remarks on guest stays.
#[async_trait]
pub trait RemarkStore: Send + Sync {
    async fn create_remark(&self, input: &CreateRemark) -> StoreResult<RemarkDetail>;

    /// Remarks on any of the given stays, newest first.
    async fn remarks_for_guests(&self, guest_ids: &[DbId]) -> StoreResult<Vec<RemarkDetail>>;
}

/// Every store handle the application needs, built once at startup.
#[derive(Clone)]
pub struct Stores {
    pub credentials: Arc<dyn CredentialStore>,
    pub directory: Arc<dyn JurisdictionDirectory>,
    pub guests: Arc<dyn GuestStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub audit: Arc<dyn AuditLog>,
    pub alerts: Arc<dyn AlertStore>,
    pub remarks: Arc<dyn RemarkStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: DbPool) -> Self {
        Self::from_shared(Arc::new(PgStore::new(pool)))
    }

    /// Process-local stores sharing one in-memory state.
    pub fn in_memory() -> Self {
        Self::from_shared(Arc::new(MemoryStore::default()))
    }

    fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: CredentialStore
            + JurisdictionDirectory
            + GuestStore
            + NotificationStore
            + AuditLog
            + AlertStore
            + RemarkStore
            + 'static,
    {
        Self {
            credentials: store.clone(),
            directory: store.clone(),
            guests: store.clone(),
            notifications: store.clone(),
            audit: store.clone(),
            alerts: store.clone(),
            remarks: store,
        }
    }
}
