// Cache maintenance

use std::sync::Arc;

use async_trait::async_trait;
use lodestar_updates::UpdateClient;

use super::Command;
use crate::{error::CliResult, output};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    Clear,
}

pub struct CacheCommand {
    client: Arc<UpdateClient>,
    action: CacheAction,
}

impl CacheCommand {
    pub fn new(client: Arc<UpdateClient>, action: CacheAction) -> Self {
        Self { client, action }
    }

    /// Whether an entry was removed
    pub async fn run(&self) -> bool {
        match self.action {
            CacheAction::Clear => self.client.clear_update_cache().await,
        }
    }
}

#[async_trait]
impl Command for CacheCommand {
    async fn execute(&self) -> CliResult<()> {
        if self.run().await {
            output::print_success("Update cache cleared");
        } else {
            output::print_info("Update cache was already empty");
        }
        Ok(())
    }
}
