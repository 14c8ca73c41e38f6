// Command routing and dispatch

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand, ValueEnum};
use lodestar_cache::{Cache, DiskStorage, FileOptionStore};
use lodestar_updates::{HostEvent, UpdateClient};
use tracing::debug;

use crate::{
    commands::*,
    error::CliResult,
    settings::Settings,
};

/// Lodestar - theme update and license client
#[derive(Parser, Debug)]
#[command(name = "lodestar")]
#[command(bin_name = "lodestar")]
#[command(about = "Check for theme updates and manage the theme license")]
#[command(
    long_about = "Lodestar asks an ordered list of update servers whether a newer theme release is published and whether the configured license key is valid.\n\nAnswers are cached on disk: update info for 24 hours, license status for 12 hours."
)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to lodestar.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check whether a newer release is published
    Check {
        /// Installed version (defaults to [theme] version)
        #[arg(long, value_name = "VERSION")]
        current_version: Option<String>,

        /// Ignore the cached answer
        #[arg(short, long)]
        force: bool,
    },

    /// Show release details for the latest published version
    Info {
        /// Installed version (defaults to [theme] version)
        #[arg(long, value_name = "VERSION")]
        current_version: Option<String>,
    },

    /// Inspect or change the license key
    License {
        #[command(subcommand)]
        action: LicenseSubcommand,
    },

    /// Manage the update cache
    Cache {
        #[command(subcommand)]
        action: CacheSubcommand,
    },

    /// Notify the client of a host lifecycle event
    Event {
        #[arg(value_enum)]
        event: EventArg,
    },

    /// List configured update servers
    Servers,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LicenseSubcommand {
    /// Show the (cached) license status
    Status,
    /// Validate a key without storing it
    Validate {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Store a key and validate it
    Activate {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Remove the stored key
    Deactivate,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSubcommand {
    /// Delete the cached update info
    Clear,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventArg {
    ThemeSwitched,
    UpgradeCompleted,
}

impl From<EventArg> for HostEvent {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::ThemeSwitched => HostEvent::ThemeSwitched,
            EventArg::UpgradeCompleted => HostEvent::UpgradeCompleted,
        }
    }
}

/// Route and execute commands
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();

        // Initialize logging based on CLI flags
        crate::logging::init_logging(cli.verbose, cli.quiet);

        let settings = Settings::load(cli.config.as_deref())?;
        Self::execute(&cli, &settings).await
    }

    /// Execute a parsed command against loaded settings
    pub async fn execute(cli: &Cli, settings: &Settings) -> CliResult<()> {
        let client = Self::build_client(settings)?;

        match &cli.command {
            Commands::Check {
                current_version,
                force,
            } => {
                let version = settings.current_version(current_version.as_deref())?;
                let cmd = CheckCommand::new(client, version)
                    .with_force(*force)
                    .with_json(cli.json);
                cmd.execute().await
            }
            Commands::Info { current_version } => {
                let version = settings.current_version(current_version.as_deref())?;
                let cmd = InfoCommand::new(client, version, cli.json);
                cmd.execute().await
            }
            Commands::License { action } => {
                let license_action = match action {
                    LicenseSubcommand::Status => LicenseAction::Status,
                    LicenseSubcommand::Validate { key } => LicenseAction::Validate(key.clone()),
                    LicenseSubcommand::Activate { key } => LicenseAction::Activate(key.clone()),
                    LicenseSubcommand::Deactivate => LicenseAction::Deactivate,
                };
                let cmd = LicenseCommand::new(client, license_action, cli.json);
                cmd.execute().await
            }
            Commands::Cache { action } => {
                let cache_action = match action {
                    CacheSubcommand::Clear => CacheAction::Clear,
                };
                let cmd = CacheCommand::new(client, cache_action);
                cmd.execute().await
            }
            Commands::Event { event } => {
                let cmd = EventCommand::new(client, (*event).into());
                cmd.execute().await
            }
            Commands::Servers => {
                let cmd = ServersCommand::new(client, cli.json);
                cmd.execute().await
            }
        }
    }

    /// Compose the update client over disk-backed storage under the data dir
    pub fn build_client(settings: &Settings) -> CliResult<Arc<UpdateClient>> {
        let cache_dir = settings.cache_dir();
        let options_path = settings.options_path();
        debug!(
            "Using cache dir {} and options file {}",
            cache_dir.display(),
            options_path.display()
        );

        let client = UpdateClient::from_config(
            settings.updater.clone(),
            Arc::new(Cache::new(Arc::new(DiskStorage::new(cache_dir)))),
            Arc::new(FileOptionStore::new(options_path)),
        )?;
        Ok(Arc::new(client))
    }
}
