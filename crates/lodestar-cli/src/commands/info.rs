// Show the theme details payload for the latest release

use std::sync::Arc;

use async_trait::async_trait;
use lodestar_updates::{ThemeInformation, UpdateClient};

use super::Command;
use crate::{
    error::CliResult,
    output::{self, OutputStyle},
};

pub struct InfoCommand {
    client: Arc<UpdateClient>,
    current_version: String,
    json: bool,
}

impl InfoCommand {
    pub fn new(client: Arc<UpdateClient>, current_version: impl Into<String>, json: bool) -> Self {
        Self {
            client,
            current_version: current_version.into(),
            json,
        }
    }

    pub async fn run(&self) -> Option<ThemeInformation> {
        self.client.theme_information(&self.current_version).await
    }

    fn render(details: &ThemeInformation, style: &OutputStyle) -> Vec<String> {
        let mut lines = vec![style.header(&format!("{} {}", details.name, details.version))];
        if !details.homepage.is_empty() {
            lines.push(style.key_value("homepage", &details.homepage));
        }
        if !details.download_link.is_empty() {
            lines.push(style.key_value("download", &details.download_link));
        }
        for (key, value) in [
            ("requires", &details.requires),
            ("tested", &details.tested),
            ("requires php", &details.requires_php),
            ("last updated", &details.last_updated),
        ] {
            if let Some(value) = value {
                lines.push(style.key_value(key, value));
            }
        }
        if !details.sections.is_empty() {
            lines.push(style.key_value("sections", ""));
            lines.extend(details.sections.keys().map(|name| style.list_item(name)));
        }
        lines
    }
}

#[async_trait]
impl Command for InfoCommand {
    async fn execute(&self) -> CliResult<()> {
        let details = self.run().await;
        if self.json {
            return output::print_json(&details);
        }

        match details {
            Some(details) => {
                let style = OutputStyle::default();
                for line in Self::render(&details, &style) {
                    println!("{}", line);
                }
            }
            None => output::print_warning("No release information available"),
        }
        Ok(())
    }
}
