#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use staywatch_api::auth::jwt::JwtConfig;
use staywatch_api::auth::password::hash_password;
use staywatch_api::auth::revocation::MemoryRevocationStore;
use staywatch_api::auth::tokens::TokenService;
use staywatch_api::config::{LoginRateLimit, ServerConfig};
use staywatch_api::rate_limit::LoginRateLimiter;
use staywatch_api::router::build_app_router;
use staywatch_api::state::AppState;
use staywatch_api::tasks::{MailError, Mailer};
use staywatch_core::guest::Gender;
use staywatch_core::roles::Role;
use staywatch_core::types::DbId;
use staywatch_db::models::guest::{AccompanyingGuests, CreateGuest, Guest};
use staywatch_db::models::station::{CreateStation, PoliceStation};
use staywatch_db::models::user::{CreateUser, User, UserProfile};
use staywatch_db::Stores;
use tower::ServiceExt;

/// Password of every seeded account.
pub const TEST_PASSWORD: &str = "s3cret-pass";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout. The connection strings are never used:
/// tests run against the in-memory stores.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "postgres://unused".to_string(),
        redis_url: "redis://unused".to_string(),
        store_timeout_secs: 5,
        revocation_timeout_secs: 3,
        login_rate_limit: LoginRateLimit {
            max_attempts: 20,
            window_secs: 900,
        },
        trust_proxy: false,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            token_expiry_days: 30,
        },
    }
}

/// Mailer that counts what it was asked to send.
#[derive(Default)]
pub struct CountingMailer {
    pub credentials: AtomicUsize,
    pub receipts: AtomicUsize,
}

impl CountingMailer {
    pub fn credentials_sent(&self) -> usize {
        self.credentials.load(Ordering::SeqCst)
    }

    pub fn receipts_sent(&self) -> usize {
        self.receipts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for CountingMailer {
    async fn send_credentials(&self, _: &str, _: &str, _: &str) -> Result<(), MailError> {
        self.credentials.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_checkout_receipt(&self, _: &Guest, _: &User) -> Result<(), MailError> {
        self.receipts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// The application under test plus direct handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
    pub tokens: Arc<TokenService>,
    pub revocations: Arc<MemoryRevocationStore>,
    pub mailer: Arc<CountingMailer>,
}

impl TestApp {
    /// A fresh router handle for one request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Issue a session token for `user` without going through login.
    pub fn token_for(&self, user: &User) -> String {
        self.tokens
            .issue(user.id, user.role, &user.username)
            .expect("token issue should succeed")
    }
}

/// Build the full application router over in-memory stores.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    build_test_app_over(config, Stores::in_memory())
}

/// Build the application over caller-supplied stores, e.g. with one store
/// swapped for a failing double.
pub fn build_test_app_over(config: ServerConfig, stores: Stores) -> TestApp {
    let revocations = Arc::new(MemoryRevocationStore::new());
    let tokens = Arc::new(TokenService::new(config.jwt.clone(), revocations.clone()));
    let mailer = Arc::new(CountingMailer::default());

    let state = AppState {
        stores: stores.clone(),
        config: Arc::new(config.clone()),
        tokens: tokens.clone(),
        login_limiter: Arc::new(LoginRateLimiter::new(config.login_rate_limit)),
        mailer: mailer.clone(),
    };
    let router = build_app_router(state, &config).expect("test config should be valid");

    TestApp {
        router,
        stores,
        tokens,
        revocations,
        mailer,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Poll `condition` until it holds or a second has passed. For effects of
/// best-effort tasks, which complete after the response.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// One Argon2 hash of [`TEST_PASSWORD`] shared by every seeded account.
fn test_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(TEST_PASSWORD).expect("hashing should succeed"))
        .clone()
}

pub async fn seed_station(stores: &Stores, name: &str, postal_codes: &[&str]) -> PoliceStation {
    stores
        .directory
        .create_station(&CreateStation {
            name: name.to_string(),
            city: "Test City".to_string(),
            postal_codes: postal_codes.iter().map(|c| c.to_string()).collect(),
        })
        .await
        .expect("station creation should succeed")
}

/// An active account with [`TEST_PASSWORD`] that may log in directly.
pub async fn seed_user(
    stores: &Stores,
    username: &str,
    role: Role,
    police_station_id: Option<DbId>,
) -> User {
    let hash = test_password_hash();
    let user = stores
        .credentials
        .create_user(&CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password_hash: hash.clone(),
            role,
            police_station_id,
            profile: UserProfile::default(),
        })
        .await
        .expect("user creation should succeed");
    stores
        .credentials
        .update_password(user.id, &hash, false)
        .await
        .expect("password update should succeed");
    stores
        .credentials
        .find_user(user.id)
        .await
        .expect("lookup should succeed")
        .expect("user should exist")
}

/// A checked-in stay at `hotel_id`.
pub async fn seed_guest(
    stores: &Stores,
    hotel_id: DbId,
    customer_id: &str,
    name: &str,
    address: &str,
    id_number: &str,
) -> Guest {
    let now = Utc::now();
    stores
        .guests
        .create_guest(&CreateGuest {
            customer_id: customer_id.to_string(),
            name: name.to_string(),
            dob: NaiveDate::from_ymd_opt(1990, 5, 17).expect("valid date"),
            gender: Gender::Female,
            phone: "9876543210".to_string(),
            email: Some(format!("{}@guest.test", customer_id.to_lowercase())),
            address: address.to_string(),
            nationality: Some("Indian".to_string()),
            id_type: "Passport".to_string(),
            id_number: id_number.to_string(),
            id_image_front_url: "https://uploads.test/front.jpg".to_string(),
            id_image_back_url: "https://uploads.test/back.jpg".to_string(),
            live_photo_url: "https://uploads.test/live.jpg".to_string(),
            accompanying_guests: AccompanyingGuests::default(),
            purpose_of_visit: "Business".to_string(),
            check_in: now,
            expected_checkout: now + chrono::Duration::days(2),
            room_number: Some("204".to_string()),
            hotel_id,
        })
        .await
        .expect("guest creation should succeed")
}
