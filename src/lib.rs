//! Shared fixtures for the workspace integration tests

use std::{fs, io, path::PathBuf};

use lodestar_cli::{CliResult, Settings};
use tempfile::TempDir;

/// Base URL of a local port nothing listens on
pub fn closed_port() -> io::Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

/// A data dir and a `lodestar.toml` pointing at `servers`
pub struct Workspace {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl Workspace {
    pub fn new(servers: &[String], installed_version: &str) -> io::Result<Self> {
        let dir = TempDir::new()?;
        let data_dir = dir.path().join("data");
        let servers = servers
            .iter()
            .map(|s| format!("\"{}\"", s))
            .collect::<Vec<_>>()
            .join(", ");

        let config_path = dir.path().join("lodestar.toml");
        fs::write(
            &config_path,
            format!(
                r#"[updater]
slug = "aurora"
site_url = "https://blog.example.com"
servers = [{servers}]

[updater.http]
timeout_secs = 5

[theme]
version = "{installed_version}"

[storage]
data_dir = "{data_dir}"
"#,
                servers = servers,
                installed_version = installed_version,
                data_dir = data_dir.display().to_string().replace('\\', "/"),
            ),
        )?;

        Ok(Self { dir, config_path })
    }

    pub fn settings(&self) -> CliResult<Settings> {
        Settings::load_with_prefix(Some(&self.config_path), "LODESTAR_IT")
    }
}
