//! Typed session cache.
//!
//! [`SessionCache`] wraps a raw [`CacheBackend`] with a [`Codec`], giving
//! callers a strongly-typed set/get/expire interface. It carries no business
//! logic: one entry per key, last write wins, every operation independent
//! per key.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::CacheBackend;
use crate::codec::{Codec, JsonCodec};
use crate::error::CacheResult;

/// Default entry lifetime: one week.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A typed cache of `T` values over a raw key-value backend.
///
/// The codec defaults to [`JsonCodec`]; use [`SessionCache::with_codec`] to
/// plug in another encoding (e.g. [`StringCodec`](crate::codec::StringCodec)
/// for pre-serialized values).
pub struct SessionCache<T, C = JsonCodec> {
    backend: Arc<dyn CacheBackend>,
    codec: C,
    default_ttl: Option<Duration>,
    _value: PhantomData<fn() -> T>,
}

impl<T, C: Codec<T>> SessionCache<T, C> {
    /// Creates a cache with an explicit codec.
    ///
    /// `default_ttl` applies to [`SessionCache::set`]; `None` means entries
    /// written through `set` never expire.
    #[must_use]
    pub fn with_codec(backend: Arc<dyn CacheBackend>, codec: C, default_ttl: Option<Duration>) -> Self {
        Self {
            backend,
            codec,
            default_ttl,
            _value: PhantomData,
        }
    }

    /// Store `value` under `key` with the default TTL.
    ///
    /// Writing an empty payload is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub async fn set(&self, key: &str, value: &T) -> CacheResult<()> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Store `value` under `key` with an explicit TTL.
    ///
    /// `ttl = None` stores the entry without expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub async fn set_with_ttl(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let bytes = self.codec.encode(value)?;
        if bytes.is_empty() {
            return Ok(());
        }
        self.backend.set(key, bytes, ttl).await
    }

    /// Fetch and decode the value under `key`.
    ///
    /// Returns `None` for a missing key, an expired key, or an empty stored
    /// value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read or decoding fails.
    pub async fn get(&self, key: &str) -> CacheResult<Option<T>> {
        match self.backend.get(key).await? {
            Some(bytes) if !bytes.is_empty() => Ok(Some(self.codec.decode(&bytes)?)),
            _ => Ok(None),
        }
    }

    /// Returns `true` if `key` currently exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    pub async fn has_key(&self, key: &str) -> CacheResult<bool> {
        self.backend.exists(key).await
    }

    /// Remove `key`. Returns `true` if a key was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub async fn delete_key(&self, key: &str) -> CacheResult<bool> {
        self.backend.delete(key).await
    }

    /// Set or replace the expiry of an existing key.
    ///
    /// Returns `false` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub async fn set_expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        self.backend.expire(key, ttl).await
    }

    /// Enumerate keys matching a glob `pattern` (`"*"` for all keys).
    ///
    /// Ordering is not guaranteed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    pub async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.backend.keys(pattern).await
    }

    /// The TTL applied by [`SessionCache::set`].
    #[must_use]
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }
}

impl<T> SessionCache<T, JsonCodec>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Creates a JSON-encoded cache with the one-week default TTL.
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_codec(backend, JsonCodec, Some(DEFAULT_TTL))
    }
}

// ============================================================================
// Tests
// ============================================================================
