//! Revocation Store Infrastructure
//!
//! Connect/disconnect-scoped key/value storage with per-entry TTL.
//!
//! A [`CacheClient`] hands out a fresh, disconnected [`CacheStore`] handle for
//! each scoped operation:
//!
//! ```text
//! store = client.store()
//! store.connect()
//! store.get(key) / store.set(key, value, ttl)
//! store.disconnect()     // always, including on failure
//! ```
//!
//! Backends:
//! - [`memory::MemoryCache`]: in-process map (single instance, tests)
//! - [`redis::RedisCache`]: networked Redis (`SETEX` / `GET` / `DEL`)

pub mod memory;
pub mod redis;

use thiserror::Error;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Cache operation, attached to query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOp {
    Set,
    Get,
    Delete,
}

impl CacheOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Get => "get",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for CacheOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Operation issued outside a connected scope
    #[error("Cache store is not connected")]
    NotConnected,

    /// Transport unreachable
    #[error("Cache connection failed: {0}")]
    Connection(#[source] BoxError),

    /// Operation failed after a successful connection
    #[error("Cache {operation} failed: {source}")]
    Query {
        operation: CacheOp,
        #[source]
        source: BoxError,
    },

    /// TTL must be a positive number of seconds
    #[error("Cache TTL must be positive (got {0})")]
    InvalidTtl(i64),
}

impl CacheError {
    pub fn query(operation: CacheOp, source: impl Into<BoxError>) -> Self {
        Self::Query {
            operation,
            source: source.into(),
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Scoped key/value store handle
///
/// `connect` and `disconnect` are idempotent. Every other operation fails with
/// [`CacheError::NotConnected`] unless the handle is connected.
#[trait_variant::make(CacheStore: Send)]
pub trait LocalCacheStore {
    async fn connect(&self) -> CacheResult<()>;

    /// Release the underlying transport
    async fn disconnect(&self) -> CacheResult<()>;

    /// Store `value` under `key`, evicted after `ttl_secs` seconds
    async fn set(&self, key: &str, value: &str, ttl_secs: i64) -> CacheResult<()>;

    /// Absent and expired keys both yield `None`
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn delete(&self, key: &str) -> CacheResult<()>;
}

/// Factory for scoped store handles
pub trait CacheClient: Send + Sync + 'static {
    type Store: CacheStore + Send + Sync;

    /// Create a new, disconnected handle
    fn store(&self) -> Self::Store;
}

pub(crate) fn check_ttl(ttl_secs: i64) -> CacheResult<u64> {
    if ttl_secs <= 0 {
        return Err(CacheError::InvalidTtl(ttl_secs));
    }
    Ok(ttl_secs as u64)
}
