//! Token issuance and revocation.

use std::sync::Arc;
use std::time::Duration;

use staywatch_core::roles::Role;
use staywatch_core::types::DbId;

use super::jwt::{generate_token, peek_expiry, validate_token, Claims, JwtConfig};
use super::revocation::{revocation_key, RevocationError, RevocationStore};

/// Issues session tokens and maintains the revocation list.
pub struct TokenService {
    jwt: JwtConfig,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenService {
    pub fn new(jwt: JwtConfig, revocations: Arc<dyn RevocationStore>) -> Self {
        Self { jwt, revocations }
    }

    pub fn issue(
        &self,
        user_id: DbId,
        role: Role,
        username: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        generate_token(user_id, role, username, &self.jwt)
    }

    /// Signature and expiry check.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        validate_token(token, &self.jwt)
    }

    /// Add `token` to the revocation list until its natural expiry.
    ///
    /// Undecodable or already-expired tokens need no entry and are ignored.
    pub async fn revoke(&self, token: &str) -> Result<(), RevocationError> {
        let Some(exp) = peek_expiry(token) else {
            return Ok(());
        };
        // With zero leeway a token still verifies during the second named by
        // `exp`; the entry must last until the first instant it no longer does.
        let rejected_from_ms = exp.saturating_add(1).saturating_mul(1000);
        let remaining_ms = rejected_from_ms - chrono::Utc::now().timestamp_millis();
        if remaining_ms <= 0 {
            return Ok(());
        }
        let ttl = Duration::from_millis(remaining_ms.unsigned_abs());
        self.revocations.insert(&revocation_key(token), ttl).await
    }

    pub async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        self.revocations.contains(&revocation_key(token)).await
    }
}
