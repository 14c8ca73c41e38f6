// List configured update servers

use std::sync::Arc;

use async_trait::async_trait;
use lodestar_updates::UpdateClient;

use super::Command;
use crate::{
    error::CliResult,
    output::{self, OutputStyle},
};

pub struct ServersCommand {
    client: Arc<UpdateClient>,
    json: bool,
}

impl ServersCommand {
    pub fn new(client: Arc<UpdateClient>, json: bool) -> Self {
        Self { client, json }
    }

    /// Endpoints in the order they are tried
    pub fn run(&self) -> Vec<String> {
        self.client
            .update_servers()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

#[async_trait]
impl Command for ServersCommand {
    async fn execute(&self) -> CliResult<()> {
        let servers = self.run();
        if self.json {
            return output::print_json(&servers);
        }

        if servers.is_empty() {
            output::print_warning("No update servers configured");
            return Ok(());
        }

        let style = OutputStyle::default();
        println!("{}", style.header("Update servers (in fallback order)"));
        for (i, server) in servers.iter().enumerate() {
            println!("{}", style.numbered_item(i + 1, server));
        }
        Ok(())
    }
}
