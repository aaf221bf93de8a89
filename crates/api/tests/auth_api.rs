//! HTTP-level integration tests for login, logout, the authorization gate
//! and the role table.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    body_json, delete_auth, get, get_auth, post_auth, post_json, post_json_auth, put_json_auth,
    seed_station, seed_user, TEST_PASSWORD,
};
use serde_json::json;
use staywatch_api::auth::revocation::{RevocationError, RevocationStore};
use staywatch_api::auth::tokens::TokenService;
use staywatch_api::config::LoginRateLimit;
use staywatch_api::rate_limit::LoginRateLimiter;
use staywatch_api::router::build_app_router;
use staywatch_api::state::AppState;
use staywatch_api::tasks::LogMailer;
use staywatch_core::account::AccountStatus;
use staywatch_core::roles::Role;
use staywatch_db::models::user::{CreateUser, UserProfile};
use staywatch_db::Stores;
use tower::ServiceExt;

async fn login(app: axum::Router, email: &str, password: &str) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_success_returns_token_and_user() {
    let t = common::build_test_app();
    let user = seed_user(&t.stores, "frontdesk", Role::Hotel, None).await;

    let response = login(t.app(), "frontdesk@test.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"]["token"].is_string());
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["user"]["username"], "frontdesk");
    assert_eq!(json["data"]["user"]["role"], "Hotel");

    // The issued token passes the gate.
    let token = json["data"]["token"].as_str().unwrap();
    let me = get_auth(t.app(), "/api/v1/users/me", token).await;
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_email_is_trimmed_and_lowercased() {
    let t = common::build_test_app();
    seed_user(&t.stores, "mixedcase", Role::Hotel, None).await;

    let response = login(t.app(), "  MixedCase@Test.COM ", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_email_and_wrong_password_are_indistinguishable() {
    let t = common::build_test_app();
    seed_user(&t.stores, "known", Role::Hotel, None).await;

    let wrong_password = login(t.app(), "known@test.com", "not-the-password").await;
    let unknown_email = login(t.app(), "nobody@test.com", TEST_PASSWORD).await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}

#[tokio::test]
async fn first_login_requires_password_change_and_issues_no_token() {
    let t = common::build_test_app();
    // Freshly provisioned accounts keep the password-change flag.
    let user = t
        .stores
        .credentials
        .create_user(&CreateUser {
            username: "newhotel".into(),
            email: "newhotel@test.com".into(),
            password_hash: staywatch_api::auth::password::hash_password("temp-pass-1").unwrap(),
            role: Role::Hotel,
            police_station_id: None,
            profile: UserProfile::default(),
        })
        .await
        .unwrap();

    let response = login(t.app(), "newhotel@test.com", "temp-pass-1").await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user_id"], user.id);
    assert!(json["data"].get("token").is_none(), "no token before the password change");

    // Short password rejected.
    let response = post_json(
        t.app(),
        "/api/v1/auth/change-password",
        json!({ "user_id": user.id, "new_password": "abc" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        t.app(),
        "/api/v1/auth/change-password",
        json!({ "user_id": user.id, "new_password": "better-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = login(t.app(), "newhotel@test.com", "better-pass").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn change_password_for_unknown_user_returns_404() {
    let t = common::build_test_app();
    let response = post_json(
        t.app(),
        "/api/v1/auth/change-password",
        json!({ "user_id": 9999, "new_password": "long-enough" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(t.app(), "/api/v1/auth/change-password", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn suspended_account_cannot_log_in() {
    let t = common::build_test_app();
    let user = seed_user(&t.stores, "suspended", Role::Hotel, None).await;
    t.stores
        .credentials
        .set_status(user.id, AccountStatus::Suspended)
        .await
        .unwrap();

    let response = login(t.app(), "suspended@test.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "your account has been suspended");
}

async fn login_from(t: &common::TestApp, forwarded_for: String) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", forwarded_for)
        .body(Body::from(
            json!({ "email": "x@test.com", "password": "whatever" }).to_string(),
        ))
        .unwrap();
    t.app().oneshot(request).await.unwrap()
}

fn limited_config(trust_proxy: bool) -> staywatch_api::config::ServerConfig {
    let mut config = common::test_config();
    config.login_rate_limit = LoginRateLimit {
        max_attempts: 2,
        window_secs: 900,
    };
    config.trust_proxy = trust_proxy;
    config
}

#[tokio::test]
async fn login_is_rate_limited_per_ip_behind_trusted_proxy() {
    let t = common::build_test_app_with(limited_config(true));

    assert_eq!(login_from(&t, "203.0.113.7".into()).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(login_from(&t, "203.0.113.7".into()).await.status(), StatusCode::UNAUTHORIZED);

    let limited = login_from(&t, "203.0.113.7".into()).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body_json(limited).await["error"],
        "too many login attempts from this ip, please try again after 15 minutes"
    );

    // Another client still has its own budget.
    assert_eq!(login_from(&t, "198.51.100.2".into()).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_the_budget() {
    let t = common::build_test_app_with(limited_config(false));

    let mut statuses = Vec::new();
    for i in 0..5 {
        statuses.push(login_from(&t, format!("10.9.9.{i}")).await.status());
    }
    assert_eq!(&statuses[..2], &[StatusCode::UNAUTHORIZED, StatusCode::UNAUTHORIZED]);
    assert!(
        statuses[2..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS),
        "spoofed addresses must share the peer's budget: {statuses:?}"
    );
}

// ---------------------------------------------------------------------------
// Logout and revocation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logged_out_token_is_rejected_before_expiry() {
    let t = common::build_test_app();
    let user = seed_user(&t.stores, "leaver", Role::Police, None).await;
    let token = t.token_for(&user);

    let response = post_auth(t.app(), "/api/v1/auth/logout", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(t.revocations.len(), 1);

    let response = get_auth(t.app(), "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "not authorized, token has been invalidated"
    );

    // A second logout with the same token fails at the gate.
    let response = post_auth(t.app(), "/api/v1/auth/logout", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_leaves_other_sessions_alone() {
    let t = common::build_test_app();
    let user = seed_user(&t.stores, "twodevices", Role::Hotel, None).await;
    let laptop = t.token_for(&user);
    let phone = t.token_for(&user);

    post_auth(t.app(), "/api/v1/auth/logout", &laptop).await;

    let response = get_auth(t.app(), "/api/v1/users/me", &phone).await;
    assert_eq!(response.status(), StatusCode::OK);
}

struct UnreachableRevocations;

#[async_trait]
impl RevocationStore for UnreachableRevocations {
    async fn insert(&self, _: &str, _: Duration) -> Result<(), RevocationError> {
        Err(RevocationError::Unavailable("connection refused".into()))
    }

    async fn contains(&self, _: &str) -> Result<bool, RevocationError> {
        Err(RevocationError::TimedOut(Duration::from_secs(3)))
    }
}

#[tokio::test]
async fn unreachable_revocation_store_fails_closed() {
    let config = common::test_config();
    let stores = Stores::in_memory();
    let tokens = Arc::new(TokenService::new(
        config.jwt.clone(),
        Arc::new(UnreachableRevocations),
    ));
    let state = AppState {
        stores: stores.clone(),
        config: Arc::new(config.clone()),
        tokens: tokens.clone(),
        login_limiter: Arc::new(LoginRateLimiter::new(config.login_rate_limit)),
        mailer: Arc::new(LogMailer),
    };
    let app = build_app_router(state, &config).unwrap();

    let user = seed_user(&stores, "closed", Role::Hotel, None).await;
    let token = tokens.issue(user.id, user.role, &user.username).unwrap();

    let response = get_auth(app, "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "not authorized, token failed");
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_or_malformed_token_is_401() {
    let t = common::build_test_app();

    let response = get(t.app(), "/api/v1/users/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "not authorized, no token provided"
    );

    let response = get_auth(t.app(), "/api/v1/users/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "not authorized, token failed");
}

#[tokio::test]
async fn deleted_users_token_is_rejected() {
    let t = common::build_test_app();
    let admin = seed_user(&t.stores, "admin", Role::RegionalAdmin, None).await;
    let hotel = seed_user(&t.stores, "closing", Role::Hotel, None).await;
    let hotel_token = t.token_for(&hotel);

    let response = delete_auth(
        t.app(),
        &format!("/api/v1/admin/users/{}", hotel.id),
        &t.token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(t.app(), "/api/v1/guests", &hotel_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "not authorized, user not found"
    );
}

#[tokio::test]
async fn suspension_applies_to_existing_tokens() {
    let t = common::build_test_app();
    let admin = seed_user(&t.stores, "admin", Role::RegionalAdmin, None).await;
    let hotel = seed_user(&t.stores, "paused", Role::Hotel, None).await;
    let hotel_token = t.token_for(&hotel);

    let response = put_json_auth(
        t.app(),
        &format!("/api/v1/admin/users/{}/status", hotel.id),
        json!({ "status": "Suspended" }),
        &t.token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(t.app(), "/api/v1/guests", &hotel_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_mismatch_is_403_not_401() {
    let t = common::build_test_app();
    let station = seed_station(&t.stores, "Central", &["110001"]).await;
    let hotel = seed_user(&t.stores, "hotel", Role::Hotel, None).await;
    let officer = seed_user(&t.stores, "officer", Role::Police, Some(station.id)).await;
    let admin = seed_user(&t.stores, "admin", Role::RegionalAdmin, None).await;

    let cases = [
        (&hotel, "/api/v1/notifications"),
        (&hotel, "/api/v1/admin/users"),
        (&officer, "/api/v1/guests"),
        (&officer, "/api/v1/admin/access-logs"),
        (&admin, "/api/v1/police/alerts"),
    ];
    for (user, uri) in cases {
        let response = get_auth(t.app(), uri, &t.token_for(user)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} on {uri}", user.role);
        assert_eq!(
            body_json(response).await["error"],
            format!("user role '{}' is not authorized for this resource", user.role)
        );
    }
}

#[tokio::test]
async fn role_is_read_from_the_live_record() {
    let t = common::build_test_app();
    let station = seed_station(&t.stores, "Central", &["110001"]).await;
    let officer = seed_user(&t.stores, "officer", Role::Police, Some(station.id)).await;
    // Forge a token claiming RegionalAdmin for a police account.
    let token = t
        .tokens
        .issue(officer.id, Role::RegionalAdmin, &officer.username)
        .unwrap();

    let response = get_auth(t.app(), "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Own account
// ---------------------------------------------------------------------------

#[tokio::test]
async fn me_hides_the_password_hash() {
    let t = common::build_test_app();
    let user = seed_user(&t.stores, "private", Role::Hotel, None).await;

    let response = get_auth(t.app(), "/api/v1/users/me", &t.token_for(&user)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "private");
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn own_password_change_requires_old_password() {
    let t = common::build_test_app();
    let user = seed_user(&t.stores, "rotator", Role::Hotel, None).await;
    let token = t.token_for(&user);

    let response = put_json_auth(
        t.app(),
        "/api/v1/users/me/password",
        json!({ "old_password": "wrong-old", "new_password": "fresh-pass" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = put_json_auth(
        t.app(),
        "/api/v1/users/me/password",
        json!({ "old_password": TEST_PASSWORD, "new_password": "tiny" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        t.app(),
        "/api/v1/users/me/password",
        json!({ "old_password": TEST_PASSWORD, "new_password": "fresh-pass" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = login(t.app(), "rotator@test.com", "fresh-pass").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_requires_a_token() {
    let t = common::build_test_app();
    let response = post_json_auth(t.app(), "/api/v1/auth/logout", json!({}), "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_changes_own_details_only() {
    let t = common::build_test_app();
    let user = seed_user(&t.stores, "grandhotel", Role::Hotel, None).await;
    let token = t.token_for(&user);

    let response = put_json_auth(
        t.app(),
        "/api/v1/users/me",
        json!({
            "email": "  Desk@GrandHotel.test ",
            "city": "Mysuru",
            "phone": "+91 80 1234 5678",
            "role": "RegionalAdmin"
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "profile updated successfully");
    assert_eq!(json["data"]["email"], "desk@grandhotel.test");
    assert_eq!(json["data"]["city"], "Mysuru");
    assert_eq!(json["data"]["role"], "Hotel");

    let stored = t.stores.credentials.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "desk@grandhotel.test");
    assert_eq!(stored.phone.as_deref(), Some("+91 80 1234 5678"));
    assert_eq!(stored.role, Role::Hotel);
}

#[tokio::test]
async fn profile_update_rejects_an_email_in_use() {
    let t = common::build_test_app();
    let user = seed_user(&t.stores, "grandhotel", Role::Hotel, None).await;
    seed_user(&t.stores, "seaview", Role::Hotel, None).await;

    let response = put_json_auth(
        t.app(),
        "/api/v1/users/me",
        json!({ "email": "seaview@test.com" }),
        &t.token_for(&user),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let stored = t.stores.credentials.find_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "grandhotel@test.com");
}
