//! `lodestar.toml` loading
//!
//! The file is layered with `LODESTAR_*` environment variables, using `__`
//! between section and key (`LODESTAR_UPDATER__SLUG`, `LODESTAR_THEME__VERSION`).
//! `LODESTAR_UPDATER__SERVERS` takes a comma separated list.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use lodestar_updates::UpdaterConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

pub const ENV_PREFIX: &str = "LODESTAR";

/// Everything the CLI host reads from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub updater: UpdaterConfig,
    #[serde(default)]
    pub theme: ThemeSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// The installed theme as the host sees it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeSettings {
    /// Installed version, overridden by `--current-version`
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root for the cache directory and the option file
    pub data_dir: Option<PathBuf>,
}

impl Settings {
    /// Load from `path` (or the default location) plus the environment.
    ///
    /// An explicit path must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> CliResult<Self> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if required && !file.exists() {
            return Err(CliError::Config(format!(
                "configuration file {} does not exist",
                file.display()
            )));
        }

        let builder = Config::builder()
            .add_source(File::from(file).format(FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// `<config dir>/lodestar/lodestar.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lodestar")
            .join("lodestar.toml")
    }

    /// Configured data dir or `<data dir>/lodestar`
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("lodestar")
        })
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir().join("cache")
    }

    pub fn options_path(&self) -> PathBuf {
        self.data_dir().join("options.json")
    }

    /// Installed version from the flag, falling back to `[theme] version`
    pub fn current_version(&self, flag: Option<&str>) -> CliResult<String> {
        flag.map(str::to_string)
            .or_else(|| self.theme.version.clone())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                CliError::invalid_argument(
                    "installed version unknown; pass --current-version or set [theme] version",
                )
            })
    }
}
