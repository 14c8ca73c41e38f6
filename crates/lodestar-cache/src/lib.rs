//! # Lodestar Cache
//!
//! Storage collaborators for the update client: an expiring key/value cache
//! (memory or disk backed) and a persistent option store.
//!
//! ## Features
//!
//! - **Expiring entries**: every value carries its own `expires_at`; an
//!   expired read is indistinguishable from a miss
//! - **Pluggable backends**: `MemoryStorage` for tests, `DiskStorage` for hosts
//! - **Option store**: durable settings such as the configured license key

pub mod cache;
pub mod error;
pub mod options;
pub mod storage;

pub use cache::{Cache, ExpiringStore};
pub use error::{CacheError, Result};
pub use options::{FileOptionStore, MemoryOptionStore, OptionStore};
pub use storage::{CacheEntry, CacheStorage, DiskStorage, MemoryStorage};
