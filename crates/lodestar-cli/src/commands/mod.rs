// Command handlers for the lodestar CLI

pub mod cache;
pub mod check;
pub mod event;
pub mod info;
pub mod license;
pub mod servers;

pub use cache::{CacheAction, CacheCommand};
pub use check::{CheckCommand, CheckReport};
pub use event::EventCommand;
pub use info::InfoCommand;
pub use license::{LicenseAction, LicenseCommand, LicenseOutcome};
pub use servers::ServersCommand;

use crate::error::CliResult;

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command and print its result
    async fn execute(&self) -> CliResult<()>;
}
