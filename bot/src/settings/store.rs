//! Configuration Store
//!
//! Key-value backends for persisted bot settings. Values are plain integers;
//! an absent key means "unset".

use async_trait::async_trait;
use dashmap::DashMap;
use fred::clients::Client;
use fred::interfaces::KeysInterface;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by settings and credential backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] fred::error::Error),
}

/// A persisted setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Process-wide default page size (`pdg`).
    GlobalPageSize,
    /// Per-guild page size override (`PexelsGuildGroup` / `pgg`).
    GuildPageSize(Uuid),
}

impl ConfigKey {
    /// Redis key for this setting under `prefix`.
    #[must_use]
    pub fn redis_key(&self, prefix: &str) -> String {
        match self {
            Self::GlobalPageSize => format!("{prefix}:pdg"),
            Self::GuildPageSize(guild_id) => format!("{prefix}:PexelsGuildGroup:{guild_id}:pgg"),
        }
    }
}

/// Integer key-value store for bot settings.
///
/// Implementations must make each individual call atomic; callers never rely
/// on multi-key transactions.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read a value, `None` when unset.
    async fn get(&self, key: ConfigKey) -> Result<Option<i64>, StoreError>;

    /// Write a value.
    async fn set(&self, key: ConfigKey, value: i64) -> Result<(), StoreError>;

    /// Clear a value back to unset.
    async fn remove(&self, key: ConfigKey) -> Result<(), StoreError>;
}

/// In-process store. Settings are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: DashMap<ConfigKey, i64>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, key: ConfigKey) -> Result<Option<i64>, StoreError> {
        Ok(self.values.get(&key).map(|v| *v))
    }

    async fn set(&self, key: ConfigKey, value: i64) -> Result<(), StoreError> {
        self.values.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: ConfigKey) -> Result<(), StoreError> {
        self.values.remove(&key);
        Ok(())
    }
}

/// Redis-backed store using plain string keys.
#[derive(Clone)]
pub struct RedisConfigStore {
    redis: Client,
    prefix: String,
}

impl RedisConfigStore {
    pub fn new(redis: Client, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl ConfigStore for RedisConfigStore {
    async fn get(&self, key: ConfigKey) -> Result<Option<i64>, StoreError> {
        let raw: Option<String> = self.redis.get(key.redis_key(&self.prefix)).await?;
        // Anything that is not an integer (e.g. a stale "[]" sentinel) reads as unset.
        Ok(raw.and_then(|v| v.trim().parse().ok()))
    }

    async fn set(&self, key: ConfigKey, value: i64) -> Result<(), StoreError> {
        let _: () = self
            .redis
            .set(key.redis_key(&self.prefix), value, None, None, false)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: ConfigKey) -> Result<(), StoreError> {
        let _: () = self.redis.del(key.redis_key(&self.prefix)).await?;
        Ok(())
    }
}
