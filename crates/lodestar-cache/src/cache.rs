//! Expiring key/value cache on top of a storage backend

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::storage::{CacheEntry, CacheStorage};

/// Expiring cache interface consumed by the update client
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Fetch a live value. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store a value for `ttl`, replacing any previous value
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;

    /// Delete a value, reporting whether one was present
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Cache that wraps every value in a `CacheEntry` before handing it to storage
pub struct Cache {
    storage: Arc<dyn CacheStorage>,
}

impl Cache {
    /// Create a new cache over the given storage
    pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
        Self { storage }
    }

    /// Underlying storage backend
    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// Drop every entry
    pub async fn clear(&self) -> Result<()> {
        self.storage.clear().await
    }
}

#[async_trait]
impl ExpiringStore for Cache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let Some(json_value) = self.storage.get(key).await? else {
            return Ok(None);
        };

        let entry: CacheEntry<Value> =
            serde_json::from_value(json_value).map_err(|e| CacheError::Deserialization {
                message: e.to_string(),
            })?;

        if entry.is_expired() {
            debug!("Cache entry '{}' expired, removing", key);
            if let Err(e) = self.storage.remove(key).await {
                warn!("Failed to remove expired cache entry '{}': {}", key, e);
            }
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(value, Some(ttl));
        let json_value = serde_json::to_value(&entry).map_err(|e| CacheError::Serialization {
            message: e.to_string(),
        })?;

        self.storage.set(key, &json_value).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.storage.remove(key).await
    }
}
