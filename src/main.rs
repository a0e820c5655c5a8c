//! OpQueue - operation queue for batched tool execution
//!
//! Main entry point for the OpQueue CLI.

mod cli;
mod commands;
mod logging;
mod setup;
mod tools;

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) = setup::load_config(cli.config.as_deref())?;
    logging::init_tracing(&config.logging)?;
    setup::check_config(&config, &source)?;

    info!("Starting OpQueue v{}", env!("CARGO_PKG_VERSION"));
    let (service, registry) = setup::build_service(&config)?;

    match cli.command {
        Commands::Run { script } => commands::run_script(&service, &script).await,
        Commands::Batch {
            operations,
            use_async,
            no_execute,
            default_timeout_ms,
        } => {
            commands::run_batch(&service, &operations, use_async, no_execute, default_timeout_ms)
                .await
        }
        Commands::Tools => commands::list_tools(&registry),
    }
}
