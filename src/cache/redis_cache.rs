use super::{ResultCache, ttl_whole_secs};

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// How long startup waits for the first Redis connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Result cache backed by a Redis server.
///
/// Values are plain strings stored with `SET key value EX ttl` and read with `GET`.
/// The connection manager reconnects on its own after a dropped connection.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Connects to `url` (`redis://` or `rediss://`) and checks the server with `PING`.
    ///
    /// Gives up after `connect_timeout` instead of retrying indefinitely.
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self> {
        let client =
            redis::Client::open(url).with_context(|| format!("invalid Redis URL '{}'", url))?;

        let connection = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .with_context(|| format!("timed out connecting to Redis after {:?}", connect_timeout))?
            .context("failed to connect to Redis")?;

        let cache = Self { connection };
        cache.ping().await?;
        Ok(cache)
    }

    pub async fn ping(&self) -> Result<()> {
        let mut connection = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .context("Redis PING failed")?;
        Ok(())
    }
}

#[async_trait]
impl ResultCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut connection)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut connection = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_whole_secs(ttl))
            .query_async(&mut connection)
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
