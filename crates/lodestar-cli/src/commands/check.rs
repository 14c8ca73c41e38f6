// Check for a newer release

use std::sync::Arc;

use async_trait::async_trait;
use lodestar_updates::{CheckFailure, UpdateCheck, UpdateClient, UpdateInfo};
use serde::Serialize;

use super::Command;
use crate::{
    error::CliResult,
    output::{self, OutputStyle},
};

/// Printable outcome of `lodestar check`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckReport {
    UpdateAvailable {
        current_version: String,
        update: UpdateInfo,
    },
    UpToDate {
        current_version: String,
        latest_version: String,
    },
    CheckFailed {
        current_version: String,
        reason: String,
        /// One line per failed server, in the order they were tried
        attempts: Vec<String>,
    },
}

impl CheckReport {
    pub fn new(current_version: impl Into<String>, outcome: UpdateCheck) -> Self {
        let current_version = current_version.into();
        match outcome {
            UpdateCheck::UpdateAvailable(update) => CheckReport::UpdateAvailable {
                current_version,
                update,
            },
            UpdateCheck::NoUpdateAvailable { latest_version } => CheckReport::UpToDate {
                current_version,
                latest_version,
            },
            UpdateCheck::CheckFailed(failure) => {
                let attempts = match &failure {
                    CheckFailure::AllServersFailed(attempts) => {
                        attempts.iter().map(ToString::to_string).collect()
                    }
                    _ => Vec::new(),
                };
                CheckReport::CheckFailed {
                    current_version,
                    reason: failure.to_string(),
                    attempts,
                }
            }
        }
    }

    /// Human readable lines
    pub fn render(&self, style: &OutputStyle) -> Vec<String> {
        match self {
            CheckReport::UpdateAvailable {
                current_version,
                update,
            } => {
                let mut lines = vec![style.success(&format!(
                    "Update available: {} -> {}",
                    current_version, update.new_version
                ))];
                if !update.package.is_empty() {
                    lines.push(style.key_value("package", &update.package));
                }
                if !update.url.is_empty() {
                    lines.push(style.key_value("details", &update.url));
                }
                if let Some(requires) = &update.requires {
                    lines.push(style.key_value("requires", requires));
                }
                if let Some(requires_php) = &update.requires_php {
                    lines.push(style.key_value("requires php", requires_php));
                }
                lines
            }
            CheckReport::UpToDate {
                current_version,
                latest_version,
            } => vec![style.info(&format!(
                "{} is up to date (latest published: {})",
                current_version, latest_version
            ))],
            CheckReport::CheckFailed {
                reason, attempts, ..
            } => {
                let mut lines = vec![style.warning(&format!("Update check failed: {}", reason))];
                lines.extend(
                    attempts
                        .iter()
                        .enumerate()
                        .map(|(i, attempt)| style.numbered_item(i + 1, attempt)),
                );
                lines
            }
        }
    }
}

/// `lodestar check`
pub struct CheckCommand {
    client: Arc<UpdateClient>,
    current_version: String,
    force: bool,
    json: bool,
}

impl CheckCommand {
    pub fn new(client: Arc<UpdateClient>, current_version: impl Into<String>) -> Self {
        Self {
            client,
            current_version: current_version.into(),
            force: false,
            json: false,
        }
    }

    /// Drop the cached feed entry before checking
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub async fn run(&self) -> CheckReport {
        if self.force {
            self.client.clear_update_cache().await;
        }
        let outcome = self
            .client
            .check_for_update_detailed(&self.current_version)
            .await;
        CheckReport::new(self.current_version.clone(), outcome)
    }
}

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self) -> CliResult<()> {
        let report = self.run().await;
        if self.json {
            return output::print_json(&report);
        }

        let style = OutputStyle::default();
        for line in report.render(&style) {
            println!("{}", line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lodestar_updates::{AttemptError, ServerAttempt};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_failed_report_lists_attempts() {
        let report = CheckReport::new(
            "1.0.0",
            UpdateCheck::CheckFailed(CheckFailure::AllServersFailed(vec![ServerAttempt {
                server: "https://a.example/".to_string(),
                error: AttemptError::Status(502),
            }])),
        );

        let lines = report.render(&OutputStyle::plain());
        assert_eq!(lines[0], "⚠ Update check failed: all 1 update servers failed");
        assert_eq!(
            lines[1],
            "  1. https://a.example/: unexpected HTTP status 502"
        );
    }

    #[test]
    fn test_up_to_date_json_shape() {
        let report = CheckReport::new(
            "1.0.0",
            UpdateCheck::NoUpdateAvailable {
                latest_version: "1.0.0".to_string(),
            },
        );

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "status": "up_to_date",
                "current_version": "1.0.0",
                "latest_version": "1.0.0"
            })
        );
    }
}
