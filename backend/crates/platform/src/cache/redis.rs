//! Redis Cache
//!
//! Each scoped handle opens its own multiplexed connection on `connect` and
//! drops it on `disconnect`.

use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client};
use tokio::sync::Mutex;

use super::{CacheClient, CacheError, CacheOp, CacheResult, CacheStore, check_ttl};

/// Redis cache client
#[derive(Debug, Clone)]
pub struct RedisCache {
    client: Client,
}

impl RedisCache {
    /// Parse the URL; no connection is made until a handle connects
    pub fn open(url: &str) -> CacheResult<Self> {
        let client = Client::open(url).map_err(|e| CacheError::Connection(Box::new(e)))?;
        Ok(Self { client })
    }
}

impl CacheClient for RedisCache {
    type Store = RedisCacheStore;

    fn store(&self) -> RedisCacheStore {
        RedisCacheStore {
            client: self.client.clone(),
            conn: Mutex::new(None),
        }
    }
}

/// Scoped handle over a [`RedisCache`]
pub struct RedisCacheStore {
    client: Client,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl RedisCacheStore {
    async fn connection(&self) -> CacheResult<MultiplexedConnection> {
        self.conn.lock().await.clone().ok_or(CacheError::NotConnected)
    }
}

impl CacheStore for RedisCacheStore {
    async fn connect(&self) -> CacheResult<()> {
        let mut slot = self.conn.lock().await;
        if slot.is_some() {
            return Ok(());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Connection(Box::new(e)))?;
        *slot = Some(conn);
        Ok(())
    }

    async fn disconnect(&self) -> CacheResult<()> {
        // Dropping the last clone closes the connection
        self.conn.lock().await.take();
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: i64) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let ttl = check_ttl(ttl_secs)?;

        conn.set_ex::<_, _, ()>(key, value, ttl)
            .await
            .map_err(|e| CacheError::query(CacheOp::Set, e))
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;

        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::query(CacheOp::Get, e))
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;

        conn.del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::query(CacheOp::Delete, e))
    }
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore").finish_non_exhaustive()
    }
}
