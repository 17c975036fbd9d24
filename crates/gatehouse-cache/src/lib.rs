//! # gatehouse-cache
//!
//! Typed session cache for the Gatehouse authentication service.
//!
//! The cache is a thin transport + serialization layer over a key-value
//! store: a [`CacheBackend`] moves opaque bytes with per-key TTLs, a
//! [`Codec`] maps typed values to those bytes, and [`SessionCache`] ties the
//! two together. No business logic lives here.
//!
//! ## Backends
//!
//! - [`RedisBackend`]: deadpool-pooled Redis, for multi-instance deployments
//! - [`MemoryBackend`]: in-process map with TTLs, for development and tests
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gatehouse_cache::{MemoryBackend, SessionCache, StringCodec};
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let sessions = SessionCache::with_codec(backend, StringCodec, None);
//! sessions.set("alice", &token).await?;
//! ```

pub mod backend;
pub mod codec;
pub mod error;
pub mod session;

pub use backend::{CacheBackend, MemoryBackend, RedisBackend};
pub use codec::{Codec, JsonCodec, StringCodec};
pub use error::{CacheError, CacheResult};
pub use session::{DEFAULT_TTL, SessionCache};
