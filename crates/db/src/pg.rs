//! PostgreSQL implementation of the store traits, delegating to the repositories.

use async_trait::async_trait;
use staywatch_core::account::AccountStatus;
use staywatch_core::guest::GuestSearch;
use staywatch_core::roles::Role;
use staywatch_core::types::{DbId, Timestamp};

use crate::error::StoreResult;
use crate::models::access_log::{AccessLog, CreateAccessLog};
use crate::models::alert::{Alert, AlertDetail, CreateAlert};
use crate::models::guest::{CreateGuest, Guest};
use crate::models::notification::{CreateNotification, Notification};
use crate::models::remark::{CreateRemark, RemarkDetail};
use crate::models::station::{CreateStation, PoliceStation};
use crate::models::user::{CreateUser, UpdateProfile, User, UserFilter};
use crate::repositories::{
    AccessLogRepo, AlertRepo, GuestRepo, NotificationRepo, RemarkRepo, StationRepo, UserRepo,
};
use crate::store::{
    AlertStore, AuditLog, CredentialStore, GuestStore, JurisdictionDirectory, NotificationStore,
    RemarkStore,
};
use crate::DbPool;

/// Store handle over a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn list_users(&self, filter: &UserFilter) -> StoreResult<Vec<User>> {
        Ok(UserRepo::list(&self.pool, filter).await?)
    }

    async fn count_users(&self, role: Role) -> StoreResult<i64> {
        Ok(UserRepo::count_by_role(&self.pool, role).await?)
    }

    async fn update_profile(&self, id: DbId, input: &UpdateProfile) -> StoreResult<Option<User>> {
        Ok(UserRepo::update_profile(&self.pool, id, input).await?)
    }

    async fn update_password(
        &self,
        id: DbId,
        password_hash: &str,
        change_required: bool,
    ) -> StoreResult<bool> {
        Ok(UserRepo::update_password(&self.pool, id, password_hash, change_required).await?)
    }

    async fn set_status(&self, id: DbId, status: AccountStatus) -> StoreResult<Option<User>> {
        Ok(UserRepo::set_status(&self.pool, id, status).await?)
    }

    async fn delete_user(&self, id: DbId) -> StoreResult<bool> {
        Ok(UserRepo::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl JurisdictionDirectory for PgStore {
    async fn create_station(&self, input: &CreateStation) -> StoreResult<PoliceStation> {
        Ok(StationRepo::create(&self.pool, input).await?)
    }

    async fn list_stations(&self) -> StoreResult<Vec<PoliceStation>> {
        Ok(StationRepo::list(&self.pool).await?)
    }

    async fn find_station(&self, id: DbId) -> StoreResult<Option<PoliceStation>> {
        Ok(StationRepo::find_by_id(&self.pool, id).await?)
    }

    async fn station_for_postal_code(&self, postal_code: &str) -> StoreResult<Option<PoliceStation>> {
        Ok(StationRepo::find_by_postal_code(&self.pool, postal_code).await?)
    }

    async fn officers_of(&self, station_id: DbId) -> StoreResult<Vec<User>> {
        Ok(UserRepo::list_by_station(&self.pool, station_id).await?)
    }
}

#[async_trait]
impl GuestStore for PgStore {
    async fn create_guest(&self, input: &CreateGuest) -> StoreResult<Guest> {
        Ok(GuestRepo::create(&self.pool, input).await?)
    }

    async fn find_guest(&self, id: DbId) -> StoreResult<Option<Guest>> {
        Ok(GuestRepo::find_by_id(&self.pool, id).await?)
    }

    async fn guests_for_hotel(
        &self,
        hotel_id: DbId,
        since: Option<Timestamp>,
    ) -> StoreResult<Vec<Guest>> {
        Ok(GuestRepo::list_for_hotel(&self.pool, hotel_id, since).await?)
    }

    async fn count_registered_since(&self, since: Timestamp) -> StoreResult<i64> {
        Ok(GuestRepo::count_registered_since(&self.pool, since).await?)
    }

    async fn search_guests(&self, search: &GuestSearch) -> StoreResult<Vec<Guest>> {
        Ok(GuestRepo::search(&self.pool, search).await?)
    }

    async fn stays_by_id_number(&self, id_number: &str) -> StoreResult<Vec<Guest>> {
        Ok(GuestRepo::list_by_id_number(&self.pool, id_number).await?)
    }

    async fn check_out(&self, id: DbId, hotel_id: DbId) -> StoreResult<Option<Guest>> {
        Ok(GuestRepo::check_out(&self.pool, id, hotel_id).await?)
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn create_notification(&self, input: &CreateNotification) -> StoreResult<Notification> {
        Ok(NotificationRepo::create(&self.pool, input).await?)
    }

    async fn notifications_for(&self, user_id: DbId, limit: i64) -> StoreResult<Vec<Notification>> {
        Ok(NotificationRepo::list_for_user(&self.pool, user_id, limit).await?)
    }

    async fn mark_read(&self, id: DbId, user_id: DbId) -> StoreResult<Option<Notification>> {
        Ok(NotificationRepo::mark_read(&self.pool, id, user_id).await?)
    }
}

#[async_trait]
impl AuditLog for PgStore {
    async fn record(&self, entry: &CreateAccessLog) -> StoreResult<AccessLog> {
        Ok(AccessLogRepo::create(&self.pool, entry).await?)
    }

    async fn query(&self, search_term: Option<&str>, limit: i64) -> StoreResult<Vec<AccessLog>> {
        Ok(AccessLogRepo::list(&self.pool, search_term, limit).await?)
    }

    async fn count_since(&self, action: &str, since: Timestamp) -> StoreResult<i64> {
        Ok(AccessLogRepo::count_since(&self.pool, action, since).await?)
    }
}

#[async_trait]
impl AlertStore for PgStore {
    async fn create_alert(&self, input: &CreateAlert) -> StoreResult<Alert> {
        Ok(AlertRepo::create(&self.pool, input).await?)
    }

    async fn find_alert(&self, id: DbId) -> StoreResult<Option<Alert>> {
        Ok(AlertRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_alerts(&self) -> StoreResult<Vec<AlertDetail>> {
        Ok(AlertRepo::list_detailed(&self.pool).await?)
    }

    async fn open_alerts(&self, limit: i64) -> StoreResult<Vec<AlertDetail>> {
        Ok(AlertRepo::list_open_detailed(&self.pool, limit).await?)
    }

    async fn alerts_for_guests(&self, guest_ids: &[DbId]) -> StoreResult<Vec<Alert>> {
        Ok(AlertRepo::list_for_guests(&self.pool, guest_ids).await?)
    }

    async fn resolve_alert(&self, id: DbId) -> StoreResult<Option<Alert>> {
        Ok(AlertRepo::resolve(&self.pool, id).await?)
    }
}

#[async_trait]
impl RemarkStore for PgStore {
    async fn create_remark(&self, input: &CreateRemark) -> StoreResult<RemarkDetail> {
        Ok(RemarkRepo::create(&self.pool, input).await?)
    }

    async fn remarks_for_guests(&self, guest_ids: &[DbId]) -> StoreResult<Vec<RemarkDetail>> {
        Ok(RemarkRepo::list_for_guests(&self.pool, guest_ids).await?)
    }
}
