// Lodestar CLI entry point

use lodestar_cli::{output, router::CommandRouter};

#[tokio::main]
async fn main() {
    if let Err(e) = CommandRouter::route().await {
        tracing::debug!("{}", e.technical_details());
        output::print_error(&e.user_message());
        std::process::exit(1);
    }
}
