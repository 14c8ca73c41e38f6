// License status and key management

use std::sync::Arc;

use async_trait::async_trait;
use lodestar_updates::{LicenseStatus, LicenseValidation, UpdateClient};
use serde::Serialize;

use super::Command;
use crate::{
    error::CliResult,
    output::{self, OutputStyle},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseAction {
    Status,
    Validate(String),
    Activate(String),
    Deactivate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LicenseOutcome {
    Status(LicenseStatus),
    Validation(LicenseValidation),
    Deactivated { removed: bool },
}

impl LicenseOutcome {
    pub fn render(&self, style: &OutputStyle) -> String {
        match self {
            LicenseOutcome::Status(status) => {
                let line = format!("License {}: {}", status.label(), status.message());
                match status {
                    LicenseStatus::Active { .. } => style.success(&line),
                    LicenseStatus::Inactive { .. } => style.info(&line),
                    LicenseStatus::Invalid { .. } => style.error(&line),
                }
            }
            LicenseOutcome::Validation(validation) if validation.valid => {
                style.success(&validation.message)
            }
            LicenseOutcome::Validation(validation) => style.error(&validation.message),
            LicenseOutcome::Deactivated { removed: true } => {
                style.success("License key removed")
            }
            LicenseOutcome::Deactivated { removed: false } => {
                style.info("No license key was configured")
            }
        }
    }
}

/// `lodestar license ...`
pub struct LicenseCommand {
    client: Arc<UpdateClient>,
    action: LicenseAction,
    json: bool,
}

impl LicenseCommand {
    pub fn new(client: Arc<UpdateClient>, action: LicenseAction, json: bool) -> Self {
        Self {
            client,
            action,
            json,
        }
    }

    pub async fn run(&self) -> LicenseOutcome {
        match &self.action {
            LicenseAction::Status => LicenseOutcome::Status(self.client.license_status().await),
            LicenseAction::Validate(key) => {
                LicenseOutcome::Validation(self.client.validate_license(key).await)
            }
            LicenseAction::Activate(key) => {
                LicenseOutcome::Validation(self.client.activate_license(key).await)
            }
            LicenseAction::Deactivate => LicenseOutcome::Deactivated {
                removed: self.client.deactivate_license().await,
            },
        }
    }
}

#[async_trait]
impl Command for LicenseCommand {
    async fn execute(&self) -> CliResult<()> {
        let outcome = self.run().await;
        if self.json {
            return output::print_json(&outcome);
        }

        println!("{}", outcome.render(&OutputStyle::default()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_rendering() {
        let style = OutputStyle::plain();
        assert_eq!(
            LicenseOutcome::Status(LicenseStatus::inactive()).render(&style),
            "ℹ License inactive: No license key configured."
        );
        assert_eq!(
            LicenseOutcome::Validation(LicenseValidation::invalid("Invalid key")).render(&style),
            "✗ Invalid key"
        );
    }

    #[test]
    fn test_outcome_json_is_untagged() {
        let value = serde_json::to_value(LicenseOutcome::Deactivated { removed: true }).unwrap();
        assert_eq!(value, json!({"removed": true}));

        let value = serde_json::to_value(LicenseOutcome::Status(LicenseStatus::inactive())).unwrap();
        assert_eq!(value["status"], "inactive");
    }
}
