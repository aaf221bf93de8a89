//! Guest stay entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use staywatch_core::guest::{Gender, GuestStatus};
use staywatch_core::types::{DbId, Timestamp};

/// A person travelling with the primary guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Companion {
    pub name: String,
    pub gender: Gender,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Adults and children accompanying the primary guest, stored as JSONB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccompanyingGuests {
    #[serde(default)]
    pub adults: Vec<Companion>,
    #[serde(default)]
    pub children: Vec<Companion>,
}

/// A row from the `guests` table: one registered stay.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Guest {
    pub id: DbId,
    pub customer_id: String,
    pub name: String,
    pub dob: NaiveDate,
    #[sqlx(try_from = "String")]
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub nationality: Option<String>,
    pub id_type: String,
    pub id_number: String,
    pub id_image_front_url: String,
    pub id_image_back_url: String,
    pub live_photo_url: String,
    #[sqlx(json)]
    pub accompanying_guests: AccompanyingGuests,
    pub purpose_of_visit: String,
    pub check_in: Timestamp,
    pub expected_checkout: Timestamp,
    pub room_number: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: GuestStatus,
    pub hotel_id: DbId,
    pub registered_at: Timestamp,
}

/// DTO for registering a stay.
#[derive(Debug, Clone)]
pub struct CreateGuest {
    pub customer_id: String,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub nationality: Option<String>,
    pub id_type: String,
    pub id_number: String,
    pub id_image_front_url: String,
    pub id_image_back_url: String,
    pub live_photo_url: String,
    pub accompanying_guests: AccompanyingGuests,
    pub purpose_of_visit: String,
    pub check_in: Timestamp,
    pub expected_checkout: Timestamp,
    pub room_number: Option<String>,
    pub hotel_id: DbId,
}
