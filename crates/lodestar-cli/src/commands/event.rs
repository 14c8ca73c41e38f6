// Forward a host lifecycle event to the update client

use std::sync::Arc;

use async_trait::async_trait;
use lodestar_updates::{HostEvent, UpdateClient};

use super::Command;
use crate::{error::CliResult, output};

pub struct EventCommand {
    client: Arc<UpdateClient>,
    event: HostEvent,
}

impl EventCommand {
    pub fn new(client: Arc<UpdateClient>, event: HostEvent) -> Self {
        Self { client, event }
    }
}

#[async_trait]
impl Command for EventCommand {
    async fn execute(&self) -> CliResult<()> {
        self.client.handle_event(self.event).await;
        output::print_success(&format!("Handled {:?}", self.event));
        Ok(())
    }
}
