//! Raw key-value backends for the session cache.
//!
//! A backend stores opaque byte values under string keys with optional
//! per-key expiry. Two implementations are provided:
//!
//! - [`RedisBackend`]: shared cache for multi-instance deployments, backed
//!   by a deadpool-managed Redis connection pool
//! - [`MemoryBackend`]: single-instance cache with TTL support, used for
//!   local development and tests

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use crate::error::{CacheError, CacheResult};

// ============================================================================
// Backend Trait
// ============================================================================

/// Raw operations a key-value backend must support.
///
/// All operations are independent per key; no cross-key atomicity is
/// guaranteed or required.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Store `value` under `key`.
    ///
    /// `ttl = None` stores the value without expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()>;

    /// Fetch the value stored under `key`.
    ///
    /// Returns `None` for a missing or expired key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Returns `true` if `key` currently exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Remove `key`. Returns `true` if a key was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Set or replace the expiry of an existing key.
    ///
    /// Returns `false` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool>;

    /// Enumerate keys matching a glob `pattern` (`*` matches everything).
    ///
    /// Ordering is not guaranteed. The result may be large; implementations
    /// must fetch it incrementally from the store rather than blocking it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;
}

// ============================================================================
// Redis Backend
// ============================================================================

/// Redis-backed implementation of [`CacheBackend`].
///
/// Connections are checked out of a deadpool pool per operation, so the
/// backend is cheap to clone and share across tasks.
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    /// Creates a backend over an existing connection pool.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates a backend from a Redis connection URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the pool cannot be built.
    /// No connection is attempted until the first operation.
    pub fn from_url(url: &str) -> CacheResult<Self> {
        let config = deadpool_redis::Config::from_url(url);
        let pool = config
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| CacheError::connection(e.to_string()))?;
        Ok(Self { pool })
    }

    async fn conn(&self) -> CacheResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::connection(e.to_string()))
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        match ttl {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
            }
            None => {
                conn.set::<_, _, ()>(key, value).await?;
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let removed: usize = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let applied: bool = conn.expire(key, ttl.as_secs() as i64).await?;
        Ok(applied)
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.conn().await?;
        // SCAN cursor iteration, not KEYS: safe on large keyspaces.
        let mut iter = conn.scan_match::<_, String>(pattern).await?;
        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}

// ============================================================================
// Memory Backend
// ============================================================================

struct MemoryEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-memory implementation of [`CacheBackend`] with TTL support.
///
/// Expired entries are dropped lazily on access.
#[derive(Default)]
pub struct MemoryBackend {
    entries: DashMap<String, MemoryEntry>,
}

impl MemoryBackend {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .count()
    }

    /// Returns `true` if the backend holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        let entry = MemoryEntry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Ok(Some(entry.value.clone()));
            }
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        match self.entries.remove(key) {
            Some((_, entry)) => Ok(!entry.is_expired()),
            None => Ok(false),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired() => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let keys = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .map(|entry| entry.key().clone())
            .filter(|key| glob_match(pattern, key))
            .collect();
        Ok(keys)
    }
}

/// Minimal glob matching supporting `*` (any run) and `?` (any one char),
/// mirroring the patterns Redis `SCAN MATCH` accepts.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn inner(p: &[u8], t: &[u8]) -> bool {
        match (p.first(), t.first()) {
            (None, None) => true,
            (Some(b'*'), _) => inner(&p[1..], t) || (!t.is_empty() && inner(p, &t[1..])),
            (Some(b'?'), Some(_)) => inner(&p[1..], &t[1..]),
            (Some(pc), Some(tc)) if pc == tc => inner(&p[1..], &t[1..]),
            _ => false,
        }
    }
    inner(pattern.as_bytes(), text.as_bytes())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_set_and_get() {
        let backend = MemoryBackend::new();
        backend.set("a", b"hello".to_vec(), None).await.unwrap();

        let value = backend.get("a").await.unwrap();
        assert_eq!(value, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_get_missing() {
        let backend = MemoryBackend::new();
        assert!(backend.get("missing").await.unwrap().is_none());
        assert!(!backend.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_overwrite() {
        let backend = MemoryBackend::new();
        backend.set("a", b"one".to_vec(), None).await.unwrap();
        backend.set("a", b"two".to_vec(), None).await.unwrap();

        assert_eq!(backend.get("a").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_expiry() {
        let backend = MemoryBackend::new();
        backend
            .set("a", b"x".to_vec(), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert!(backend.exists("a").await.unwrap());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(backend.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_delete() {
        let backend = MemoryBackend::new();
        backend.set("a", b"x".to_vec(), None).await.unwrap();

        assert!(backend.delete("a").await.unwrap());
        assert!(!backend.delete("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_expire_existing_key() {
        let backend = MemoryBackend::new();
        backend.set("a", b"x".to_vec(), None).await.unwrap();

        assert!(backend.expire("a", Duration::from_millis(10)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(backend.get("a").await.unwrap().is_none());

        assert!(!backend.expire("missing", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_keys_pattern() {
        let backend = MemoryBackend::new();
        backend.set("user:alice", b"1".to_vec(), None).await.unwrap();
        backend.set("user:bob", b"2".to_vec(), None).await.unwrap();
        backend.set("other", b"3".to_vec(), None).await.unwrap();

        let mut keys = backend.keys("user:*").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["user:alice", "user:bob"]);

        let all = backend.keys("*").await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("user:*", "user:alice"));
        assert!(!glob_match("user:*", "role:admin"));
        assert!(glob_match("u?er", "user"));
        assert!(!glob_match("u?er", "uber2"));
        assert!(glob_match("", ""));
    }

    #[test]
    fn test_redis_backend_rejects_bad_url() {
        assert!(RedisBackend::from_url("not-a-url").is_err());
    }
}
