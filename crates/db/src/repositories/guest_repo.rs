//! Repository for the `guests` table.

use sqlx::types::Json;
use sqlx::PgPool;
use staywatch_core::guest::{GuestSearch, GuestStatus, SearchBy};
use staywatch_core::types::{DbId, Timestamp};

use super::contains_pattern;
use crate::models::guest::{CreateGuest, Guest};

const COLUMNS: &str = "id, customer_id, name, dob, gender, phone, email, address, nationality, \
                       id_type, id_number, id_image_front_url, id_image_back_url, live_photo_url, \
                       accompanying_guests, purpose_of_visit, check_in, expected_checkout, \
                       room_number, status, hotel_id, registered_at";

/// Guest registration, search and checkout.
pub struct GuestRepo;

impl GuestRepo {
    /// Register a stay. A colliding `customer_id` violates `uq_guests_customer_id`.
    pub async fn create(pool: &PgPool, input: &CreateGuest) -> Result<Guest, sqlx::Error> {
        let query = format!(
            "INSERT INTO guests (customer_id, name, dob, gender, phone, email, address, nationality, \
                                 id_type, id_number, id_image_front_url, id_image_back_url, \
                                 live_photo_url, accompanying_guests, purpose_of_visit, check_in, \
                                 expected_checkout, room_number, hotel_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Guest>(&query)
            .bind(&input.customer_id)
            .bind(&input.name)
            .bind(input.dob)
            .bind(input.gender.as_str())
            .bind(&input.phone)
            .bind(input.email.as_deref())
            .bind(&input.address)
            .bind(input.nationality.as_deref())
            .bind(&input.id_type)
            .bind(&input.id_number)
            .bind(&input.id_image_front_url)
            .bind(&input.id_image_back_url)
            .bind(&input.live_photo_url)
            .bind(Json(&input.accompanying_guests))
            .bind(&input.purpose_of_visit)
            .bind(input.check_in)
            .bind(input.expected_checkout)
            .bind(input.room_number.as_deref())
            .bind(input.hotel_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Guest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM guests WHERE id = $1");
        sqlx::query_as::<_, Guest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Stays registered by a hotel, newest first, optionally only those
    /// registered at or after `since`.
    pub async fn list_for_hotel(
        pool: &PgPool,
        hotel_id: DbId,
        since: Option<Timestamp>,
    ) -> Result<Vec<Guest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM guests
             WHERE hotel_id = $1 AND ($2::timestamptz IS NULL OR registered_at >= $2)
             ORDER BY registered_at DESC, id DESC"
        );
        sqlx::query_as::<_, Guest>(&query)
            .bind(hotel_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Number of stays registered at or after `since`, across all hotels.
    pub async fn count_registered_since(pool: &PgPool, since: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM guests WHERE registered_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await
    }

    /// Police search: `name`/`phone` match a case-insensitive substring;
    /// `id` matches the exact customer id or a substring of the document number.
    pub async fn search(pool: &PgPool, search: &GuestSearch) -> Result<Vec<Guest>, sqlx::Error> {
        let filter = match search.search_by {
            SearchBy::Name => "name ILIKE $1",
            SearchBy::Phone => "phone ILIKE $1",
            SearchBy::Id => "customer_id = $2 OR id_number ILIKE $1",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM guests WHERE {filter} ORDER BY registered_at DESC, id DESC"
        );
        let mut q = sqlx::query_as::<_, Guest>(&query).bind(contains_pattern(&search.query));
        if search.search_by == SearchBy::Id {
            q = q.bind(&search.query);
        }
        q.fetch_all(pool).await
    }

    /// Every stay recorded under the same identity document, newest check-in first.
    pub async fn list_by_id_number(pool: &PgPool, id_number: &str) -> Result<Vec<Guest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM guests WHERE id_number = $1 ORDER BY check_in DESC, id DESC"
        );
        sqlx::query_as::<_, Guest>(&query)
            .bind(id_number)
            .fetch_all(pool)
            .await
    }

    /// Transition a checked-in stay to checked-out.
    ///
    /// Conditional on the current status, so concurrent checkouts transition
    /// at most once. Returns `None` when nothing changed.
    pub async fn check_out(pool: &PgPool, id: DbId, hotel_id: DbId) -> Result<Option<Guest>, sqlx::Error> {
        let query = format!(
            "UPDATE guests SET status = $3
             WHERE id = $1 AND hotel_id = $2 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Guest>(&query)
            .bind(id)
            .bind(hotel_id)
            .bind(GuestStatus::CheckedOut.as_str())
            .bind(GuestStatus::CheckedIn.as_str())
            .fetch_optional(pool)
            .await
    }
}
