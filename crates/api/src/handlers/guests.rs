//! Handlers for the `/guests` resource (hotel front desk).
//!
//! All handlers require the `Hotel` role. A hotel only ever sees and modifies
//! its own stays.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use staywatch_core::account::normalize_email;
use staywatch_core::error::CoreError;
use staywatch_core::guest::{
    ensure_can_check_out, generate_customer_id, Gender, ALREADY_CHECKED_OUT,
};
use staywatch_core::types::{start_of_day, DbId, Timestamp};
use staywatch_db::models::guest::{AccompanyingGuests, CreateGuest, Guest};
use staywatch_db::StoreError;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{HotelOnly, RequireRole};
use crate::response::{ApiJson, ApiPath, DataResponse, MessageResponse};
use crate::state::AppState;
use crate::tasks::spawn_best_effort;

/// Attempts at drawing an unused customer id before giving up.
const CUSTOMER_ID_ATTEMPTS: usize = 3;

const CUSTOMER_ID_CONSTRAINT: &str = "uq_guests_customer_id";

/// Request body for `POST /guests`.
///
/// The three image URLs are produced by the upload service before the form
/// is submitted.
#[derive(Debug, Deserialize)]
pub struct RegisterGuestRequest {
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub nationality: Option<String>,
    pub id_type: String,
    pub id_number: String,
    pub id_image_front_url: Option<String>,
    pub id_image_back_url: Option<String>,
    pub live_photo_url: Option<String>,
    #[serde(default)]
    pub accompanying_guests: AccompanyingGuests,
    pub purpose_of_visit: String,
    /// Defaults to the time of registration.
    pub check_in: Option<Timestamp>,
    pub expected_checkout: Timestamp,
    pub room_number: Option<String>,
}

fn required_text(value: &str, field: &str) -> Result<String, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn required_upload(value: Option<String>) -> Result<String, CoreError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            CoreError::Validation(
                "image upload failed. front, back, and live photos are required".into(),
            )
        })
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RegisterGuestRequest {
    /// Validate the form into a store DTO, leaving `customer_id` blank.
    fn into_create(self, hotel_id: DbId) -> Result<CreateGuest, CoreError> {
        let id_image_front_url = required_upload(self.id_image_front_url)?;
        let id_image_back_url = required_upload(self.id_image_back_url)?;
        let live_photo_url = required_upload(self.live_photo_url)?;

        let check_in = self.check_in.unwrap_or_else(Utc::now);
        if self.expected_checkout < check_in {
            return Err(CoreError::Validation(
                "expected checkout must not be before check-in".into(),
            ));
        }

        let email = match optional_text(self.email) {
            Some(email) => Some(normalize_email(&email)?),
            None => None,
        };

        Ok(CreateGuest {
            customer_id: String::new(),
            name: required_text(&self.name, "name")?,
            dob: self.dob,
            gender: self.gender,
            phone: required_text(&self.phone, "phone")?,
            email,
            address: required_text(&self.address, "address")?,
            nationality: optional_text(self.nationality),
            id_type: required_text(&self.id_type, "id type")?,
            id_number: required_text(&self.id_number, "id number")?,
            id_image_front_url,
            id_image_back_url,
            live_photo_url,
            accompanying_guests: self.accompanying_guests,
            purpose_of_visit: required_text(&self.purpose_of_visit, "purpose of visit")?,
            check_in,
            expected_checkout: self.expected_checkout,
            room_number: optional_text(self.room_number),
            hotel_id,
        })
    }
}

/// POST /api/v1/guests
pub async fn register_guest(
    State(state): State<AppState>,
    RequireRole(hotel, _): RequireRole<HotelOnly>,
    ApiJson(input): ApiJson<RegisterGuestRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse<Guest>>)> {
    let mut create = input.into_create(hotel.user.id)?;

    let mut attempt = 0;
    let guest = loop {
        attempt += 1;
        create.customer_id = generate_customer_id();
        match state.stores.guests.create_guest(&create).await {
            Ok(guest) => break guest,
            Err(StoreError::Conflict(c))
                if c == CUSTOMER_ID_CONSTRAINT && attempt < CUSTOMER_ID_ATTEMPTS =>
            {
                tracing::debug!(attempt, "Customer id collision, drawing another");
            }
            Err(e) => return Err(e.into()),
        }
    };

    tracing::info!(
        hotel_id = hotel.user.id,
        guest_id = guest.id,
        customer_id = %guest.customer_id,
        "Guest registered",
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            data: guest,
            message: "guest registered successfully",
        }),
    ))
}

/// GET /api/v1/guests
///
/// Every stay registered by the calling hotel, newest first.
pub async fn list_guests(
    State(state): State<AppState>,
    RequireRole(hotel, _): RequireRole<HotelOnly>,
) -> AppResult<Json<DataResponse<Vec<Guest>>>> {
    let guests = state
        .stores
        .guests
        .guests_for_hotel(hotel.user.id, None)
        .await?;
    Ok(Json(DataResponse { data: guests }))
}

/// GET /api/v1/guests/today
///
/// Stays registered since midnight UTC.
pub async fn list_todays_guests(
    State(state): State<AppState>,
    RequireRole(hotel, _): RequireRole<HotelOnly>,
) -> AppResult<Json<DataResponse<Vec<Guest>>>> {
    let midnight = start_of_day(Utc::now());
    let guests = state
        .stores
        .guests
        .guests_for_hotel(hotel.user.id, Some(midnight))
        .await?;
    Ok(Json(DataResponse { data: guests }))
}

/// PUT /api/v1/guests/{id}/checkout
///
/// The status transition is conditional in the store, so of two racing
/// checkouts exactly one succeeds and only that one dispatches the receipt.
pub async fn check_out(
    State(state): State<AppState>,
    RequireRole(hotel, _): RequireRole<HotelOnly>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<MessageResponse<Guest>>> {
    let hotel = hotel.user;

    let existing = state
        .stores
        .guests
        .find_guest(id)
        .await?
        .filter(|g| g.hotel_id == hotel.id)
        .ok_or(CoreError::NotFound { entity: "guest", id })?;
    ensure_can_check_out(existing.status)?;

    let Some(guest) = state.stores.guests.check_out(id, hotel.id).await? else {
        // A concurrent checkout won the conditional update.
        return Err(AppError::Core(CoreError::Validation(ALREADY_CHECKED_OUT.into())));
    };

    tracing::info!(hotel_id = hotel.id, guest_id = guest.id, customer_id = %guest.customer_id, "Guest checked out");

    let mailer = state.mailer.clone();
    let receipt_guest = guest.clone();
    spawn_best_effort("checkout_receipt", async move {
        mailer.send_checkout_receipt(&receipt_guest, &hotel).await
    });

    Ok(Json(MessageResponse {
        data: guest,
        message: "guest checked out successfully",
    }))
}
