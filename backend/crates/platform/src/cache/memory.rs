//! In-Process Cache
//!
//! Shared map with TTL on the tokio monotonic clock. Suitable for a single
//! API instance and for tests (pause the clock with `tokio::time::pause`).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{CacheClient, CacheError, CacheResult, CacheStore, check_ttl};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

type Entries = Arc<Mutex<HashMap<String, Entry>>>;

/// In-memory cache client
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Entries,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, e| e.is_live(now));
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining lifetime of a live key
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now)
    }
}

impl CacheClient for MemoryCache {
    type Store = MemoryCacheStore;

    fn store(&self) -> MemoryCacheStore {
        MemoryCacheStore {
            entries: Arc::clone(&self.entries),
            connected: AtomicBool::new(false),
        }
    }
}

/// Scoped handle over a [`MemoryCache`]
#[derive(Debug)]
pub struct MemoryCacheStore {
    entries: Entries,
    connected: AtomicBool,
}

impl MemoryCacheStore {
    fn ensure_connected(&self) -> CacheResult<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CacheError::NotConnected)
        }
    }
}

impl CacheStore for MemoryCacheStore {
    async fn connect(&self) -> CacheResult<()> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn disconnect(&self) -> CacheResult<()> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: i64) -> CacheResult<()> {
        self.ensure_connected()?;
        let ttl = check_ttl(ttl_secs)?;

        let now = Instant::now();
        let entry = Entry {
            value: value.to_string(),
            expires_at: now + Duration::from_secs(ttl),
        };

        // Sweep expired entries on every write
        let mut entries = self.entries.lock().await;
        entries.retain(|_, e| e.is_live(now));
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.ensure_connected()?;

        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.ensure_connected()?;
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
