//! Persistent option store
//!
//! Holds durable settings (the configured license key, for instance) that
//! outlive any cache entry.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex, sync::RwLock};

use crate::{CacheError, Result};

/// Key/value option store
#[async_trait]
pub trait OptionStore: Send + Sync {
    /// Read an option
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write an option
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove an option, reporting whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// Read an option, falling back to `default` when absent
    async fn get_or(&self, key: &str, default: Value) -> Result<Value> {
        Ok(self.get(key).await?.unwrap_or(default))
    }
}

/// Option store kept in memory
#[derive(Default)]
pub struct MemoryOptionStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with one value
    pub fn with_value(key: &str, value: Value) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value);
        Self {
            values: RwLock::new(values),
        }
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.values.write().await.remove(key).is_some())
    }
}

/// Option store persisted as a single JSON object on disk
pub struct FileOptionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileOptionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(CacheError::Storage {
                message: format!("{} does not hold a JSON object", self.path.display()),
            }),
        }
    }

    async fn save(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(map)?;

        // Write to temp file first, then rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl OptionStore for FileOptionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        map.insert(key.to_string(), value);
        self.save(&map).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut map = self.load().await?;
        let removed = map.remove(key).is_some();
        if removed {
            self.save(&map).await?;
        }
        Ok(removed)
    }
}
