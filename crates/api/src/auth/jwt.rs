//! Session token generation and validation.
//!
//! Session tokens are HS256-signed JWTs containing a [`Claims`] payload. They
//! are not stored server-side; logout is handled by the revocation list in
//! [`super::revocation`].

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use staywatch_core::roles::Role;
use staywatch_core::types::DbId;
use uuid::Uuid;

use crate::config::{env_or, required, ConfigError};

/// Session lifetime in days. `JWT_TOKEN_EXPIRY_DAYS` may override it for
/// deployments and tests.
const DEFAULT_TOKEN_EXPIRY_DAYS: i64 = 30;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// JWT claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Role at issue time. Informational only: authorization always reads the
    /// live user record.
    pub role: Role,
    pub username: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Session token lifetime in days (default: 30).
    pub token_expiry_days: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `JWT_SECRET`            | **yes**  | --      |
    /// | `JWT_TOKEN_EXPIRY_DAYS` | no       | `30`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let token_expiry_days = env_or("JWT_TOKEN_EXPIRY_DAYS", DEFAULT_TOKEN_EXPIRY_DAYS)?;
        if token_expiry_days <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_TOKEN_EXPIRY_DAYS",
                value: token_expiry_days.to_string(),
            });
        }
        Ok(Self {
            secret: required("JWT_SECRET")?,
            token_expiry_days,
        })
    }
}

/// Generate an HS256 session token for the given user.
pub fn generate_token(
    user_id: DbId,
    role: Role,
    username: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role,
        username: username.to_string(),
        exp: now + config.token_expiry_days * SECONDS_PER_DAY,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode a session token, returning the embedded [`Claims`].
///
/// Expiry is checked with zero leeway: a token is rejected from the second
/// its `exp` passes, which is also when its revocation entry lapses.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[derive(Deserialize)]
struct ExpiryOnly {
    exp: i64,
}

/// Read the `exp` claim WITHOUT verifying the signature or expiry.
///
/// Only used to size a revocation entry's TTL; never to authenticate.
pub fn peek_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    decode::<ExpiryOnly>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            token_expiry_days: DEFAULT_TOKEN_EXPIRY_DAYS,
        }
    }

    fn encode_claims(claims: &Claims, config: &JwtConfig) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    #[test]
    fn token_round_trips_identity_and_lifetime() {
        let config = test_config();
        let token = generate_token(42, Role::Police, "raj", &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Police);
        assert_eq!(claims.username, "raj");
        assert_eq!(claims.exp - claims.iat, 30 * SECONDS_PER_DAY);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn token_is_rejected_the_second_it_expires() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        // Inside the library's default 60 s leeway, so only zero leeway rejects it.
        let token = encode_claims(
            &Claims {
                sub: 1,
                role: Role::Hotel,
                username: "hotel".into(),
                exp: now - 5,
                iat: now - 100,
                jti: Uuid::new_v4().to_string(),
            },
            &config,
        );
        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn different_secret_fails() {
        let token = generate_token(1, Role::Hotel, "hotel", &test_config()).unwrap();
        let other = JwtConfig {
            secret: "secret-bravo".into(),
            token_expiry_days: 30,
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn peek_reads_expiry_of_expired_or_foreign_tokens() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: Role::Hotel,
            username: "hotel".into(),
            exp: now - 600,
            iat: now - 700,
            jti: "x".into(),
        };
        let token = encode_claims(&claims, &config);
        assert_eq!(peek_expiry(&token), Some(now - 600));

        let foreign = generate_token(1, Role::Hotel, "hotel", &JwtConfig {
            secret: "another".into(),
            token_expiry_days: 1,
        })
        .unwrap();
        assert!(peek_expiry(&foreign).is_some());
    }

    #[test]
    fn peek_rejects_garbage() {
        assert_eq!(peek_expiry("not-a-jwt"), None);
    }
}
