//! Revocation list for logged-out session tokens.
//!
//! Each entry is keyed by `revoked:<sha256-hex(token)>` and expires exactly
//! when the token itself would, so the list never outgrows the set of
//! still-valid tokens.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use staywatch_core::hashing::sha256_hex;

/// Key prefix for revocation entries.
const KEY_PREFIX: &str = "revoked:";

/// The revocation list could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),

    #[error("revocation store timed out after {0:?}")]
    TimedOut(Duration),
}

/// Storage for revocation entries.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Store `key` for `ttl`, after which it disappears on its own.
    async fn insert(&self, key: &str, ttl: Duration) -> Result<(), RevocationError>;

    async fn contains(&self, key: &str) -> Result<bool, RevocationError>;
}

/// Revocation key for a raw bearer token. Only the digest is stored.
pub fn revocation_key(token: &str) -> String {
    format!("{KEY_PREFIX}{}", sha256_hex(token.as_bytes()))
}

// ---------------------------------------------------------------------------
// Redis
// ---------------------------------------------------------------------------

/// Redis-backed list (`SET key 1 PX ttl` / `EXISTS key`).
#[derive(Clone)]
pub struct RedisRevocationStore {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisRevocationStore {
    /// Connect to `redis_url`. Every later call is bounded by `timeout`.
    pub async fn connect(redis_url: &str, timeout: Duration) -> Result<Self, RevocationError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
        let conn = bounded(timeout, ConnectionManager::new(client)).await?;
        Ok(Self { conn, timeout })
    }
}

async fn bounded<T>(
    timeout: Duration,
    fut: impl Future<Output = redis::RedisResult<T>>,
) -> Result<T, RevocationError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(RevocationError::Unavailable(e.to_string())),
        Err(_) => Err(RevocationError::TimedOut(timeout)),
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn insert(&self, key: &str, ttl: Duration) -> Result<(), RevocationError> {
        let mut conn = self.conn.clone();
        // PX rejects 0.
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(1).arg("PX").arg(ttl_ms);
        bounded(self.timeout, cmd.query_async::<_, ()>(&mut conn)).await
    }

    async fn contains(&self, key: &str) -> Result<bool, RevocationError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("EXISTS");
        cmd.arg(key);
        bounded(self.timeout, cmd.query_async::<_, bool>(&mut conn)).await
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local list with per-entry deadlines. Expired entries are purged
/// on every insert.
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|deadline| **deadline > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn insert(&self, key: &str, ttl: Duration) -> Result<(), RevocationError> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| RevocationError::Unavailable("lock poisoned".into()))?;
        entries.retain(|_, deadline| *deadline > now);
        entries.insert(key.to_string(), now + ttl);
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, RevocationError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| RevocationError::Unavailable("lock poisoned".into()))?;
        Ok(entries
            .get(key)
            .is_some_and(|deadline| *deadline > Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_hides_the_token() {
        let key = revocation_key("eyJhbGciOi.secret.sig");
        assert!(key.starts_with("revoked:"));
        assert!(!key.contains("secret"));
        assert_eq!(key.len(), "revoked:".len() + 64);
    }

    #[tokio::test]
    async fn entry_lives_until_its_deadline() {
        let store = MemoryRevocationStore::new();
        store.insert("revoked:a", Duration::from_millis(40)).await.unwrap();
        assert!(store.contains("revoked:a").await.unwrap());
        assert!(!store.contains("revoked:b").await.unwrap());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!store.contains("revoked:a").await.unwrap());
    }

    #[tokio::test]
    async fn expired_entries_are_purged_on_insert() {
        let store = MemoryRevocationStore::new();
        store.insert("revoked:old", Duration::from_millis(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.insert("revoked:new", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.len(), 1);
    }
}
