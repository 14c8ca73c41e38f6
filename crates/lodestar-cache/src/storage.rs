//! Cache storage backends

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};

use crate::{CacheError, Result};

/// Cache entry with its expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T: Clone> {
    /// The cached data
    pub data: T,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
    /// When the entry expires (None = never)
    pub expires_at: Option<DateTime<Utc>>,
}

impl<T: Clone> CacheEntry<T> {
    /// Create a new cache entry
    pub fn new(data: T, ttl: Option<Duration>) -> Self {
        let created_at = Utc::now();
        let expires_at = ttl
            .and_then(|t| chrono::Duration::from_std(t).ok())
            .and_then(|t| created_at.checked_add_signed(t));

        Self {
            data,
            created_at,
            expires_at,
        }
    }

    /// Create an entry with an explicit expiry instant
    pub fn expiring_at(data: T, expires_at: DateTime<Utc>) -> Self {
        Self {
            data,
            created_at: Utc::now(),
            expires_at: Some(expires_at),
        }
    }

    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against a given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|expires| now >= expires).unwrap_or(false)
    }

    /// Get remaining TTL
    pub fn ttl_remaining(&self) -> Option<Duration> {
        (self.expires_at? - Utc::now()).to_std().ok()
    }
}

/// Cache storage trait
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Store a value
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    /// Retrieve a value
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Remove a value
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Check if key exists
    async fn contains(&self, key: &str) -> Result<bool>;

    /// Clear all entries
    async fn clear(&self) -> Result<()>;

    /// Get all keys
    async fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory cache storage
pub struct MemoryStorage {
    data: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl MemoryStorage {
    /// Create new in-memory storage
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let mut data = self.data.write().await;
        data.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        Ok(data.remove(key).is_some())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        let data = self.data.read().await;
        Ok(data.contains_key(key))
    }

    async fn clear(&self) -> Result<()> {
        let mut data = self.data.write().await;
        data.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let data = self.data.read().await;
        Ok(data.keys().cloned().collect())
    }
}

/// Disk-based cache storage, one JSON file per key
pub struct DiskStorage {
    base_path: PathBuf,
}

impl DiskStorage {
    /// Create new disk storage with base path
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Base directory holding the `.cache` files
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get file path for a key
    fn key_path(&self, key: &str) -> PathBuf {
        // Sanitize key for filesystem
        let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        self.base_path.join(format!("{}.cache", safe_key))
    }

    /// Ensure base directory exists
    async fn ensure_base_dir(&self) -> Result<()> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path).await?;
        }
        Ok(())
    }

    fn is_cache_file(path: &Path) -> bool {
        path.extension().map_or(false, |ext| ext == "cache")
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.ensure_base_dir().await?;

        let file_path = self.key_path(key);
        let json_data =
            serde_json::to_string_pretty(value).map_err(|e| CacheError::Serialization {
                message: e.to_string(),
            })?;

        // Whole-value replacement: write aside, then rename over the old file
        let temp_path = file_path.with_extension("cache.tmp");
        fs::write(&temp_path, json_data).await?;
        fs::rename(&temp_path, &file_path).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let file_path = self.key_path(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let json_data = fs::read_to_string(&file_path).await?;
        let value: serde_json::Value =
            serde_json::from_str(&json_data).map_err(|e| CacheError::Deserialization {
                message: e.to_string(),
            })?;

        Ok(Some(value))
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let file_path = self.key_path(key);

        if file_path.exists() {
            fs::remove_file(&file_path).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.key_path(key).exists())
    }

    async fn clear(&self) -> Result<()> {
        if self.base_path.exists() {
            let mut entries = fs::read_dir(&self.base_path).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if Self::is_cache_file(&path) {
                    fs::remove_file(&path).await?;
                }
            }
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !Self::is_cache_file(&path) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(name.to_string());
            }
        }
        Ok(keys)
    }
}
