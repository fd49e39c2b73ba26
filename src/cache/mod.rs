//! JSON values in Redis, shared across workers.
//!
//! Only the public project listing and `/auth/me` are cached. Every method
//! returns the Redis error to the caller, who logs it and carries on without
//! the cache.

use redis::{AsyncCommands, Client, ErrorKind, RedisError, RedisResult, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

fn codec_error(context: &'static str, e: serde_json::Error) -> RedisError {
    RedisError::from((ErrorKind::TypeError, context, e.to_string()))
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Read and decode `key`; `None` on a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> RedisResult<Option<T>> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(key).await?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| codec_error("Cached value is not valid JSON", e))
        })
        .transpose()
    }

    /// Encode and store `value`, expiring after `ttl` when one is given.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> RedisResult<()> {
        let json =
            serde_json::to_string(value).map_err(|e| codec_error("Value cannot be cached", e))?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(json);
        if let Some(ttl) = ttl {
            // Redis rejects EX 0.
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }

        cmd.query_async(&mut self.connection.clone()).await
    }

    /// Delete every key matching a glob pattern. Walks the keyspace with SCAN
    /// so a large cache does not block the server.
    pub async fn delete_pattern(&self, pattern: &str) -> RedisResult<()> {
        let mut conn = self.connection.clone();

        let mut matched = Vec::new();
        {
            let mut keys = conn.scan_match::<_, String>(pattern).await?;
            while let Some(key) = keys.next_item().await {
                matched.push(key);
            }
        }

        if !matched.is_empty() {
            let _: () = self.connection.clone().del(matched).await?;
        }

        Ok(())
    }

    /// Drop every cached project listing. Runs after each project mutation;
    /// failures are logged, never returned, so a cache outage cannot fail a write.
    pub async fn invalidate_project_listings(&self) {
        match self.delete_pattern(keys::PROJECT_LISTS_PATTERN).await {
            Ok(()) => tracing::debug!("Project listing cache cleared"),
            Err(e) => tracing::warn!("Failed to invalidate project listings: {e}"),
        }
    }
}

pub mod keys {
    /// Matches every key produced by [`project_list`].
    pub const PROJECT_LISTS_PATTERN: &str = "projects:list:*";

    /// One public listing page; `filters` is the serialized filter set.
    pub fn project_list(filters: &str) -> String {
        format!("projects:list:{filters}")
    }

    pub fn user(id: &str) -> String {
        format!("user:{id}")
    }
}

/// Expiry of each cached kind, from `CACHE_TTL_*` (seconds).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub project_list_ttl: Duration,
    pub user_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            project_list_ttl: Duration::from_secs(5 * 60),
            user_ttl: Duration::from_secs(15 * 60),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            project_list_ttl: ttl_from_env("CACHE_TTL_PROJECT_LIST", defaults.project_list_ttl),
            user_ttl: ttl_from_env("CACHE_TTL_USERS", defaults.user_ttl),
        }
    }
}

/// Unset or unparsable values keep the default.
fn ttl_from_env(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

/// Shape of the cache in actix app data.
pub type CacheData = Arc<RedisCache>;
