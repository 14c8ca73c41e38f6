//! Theme update and license client
//!
//! Polls an ordered list of update servers for newer releases and license
//! validity, falling back server by server and caching answers so the host
//! does not hit the network on every page load.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lodestar_cache::{Cache, MemoryOptionStore, MemoryStorage};
//! use lodestar_updates::{UpdateClient, UpdaterConfig};
//!
//! # async fn run() -> lodestar_updates::Result<()> {
//! let config = UpdaterConfig::new(
//!     "aurora",
//!     "https://blog.example.com",
//!     ["https://updates.example.com", "https://mirror.example.com"],
//! );
//! let client = UpdateClient::from_config(
//!     config,
//!     Arc::new(Cache::new(Arc::new(MemoryStorage::new()))),
//!     Arc::new(MemoryOptionStore::new()),
//! )?;
//!
//! if let Some(update) = client.check_for_update("1.0.0").await {
//!     println!("{} is available", update.new_version);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod servers;
pub mod version;

pub use client::UpdateClient;
pub use config::UpdaterConfig;
pub use error::{AttemptError, CheckFailure, Result, ServerAttempt, UpdateError};
pub use models::{
    HostEvent, LicenseStatus, LicenseValidation, ThemeInformation, ThemeUpdate, UpdateCheck,
    UpdateInfo,
};
pub use servers::ServerList;
