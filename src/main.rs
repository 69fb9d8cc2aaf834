//! quantum-stock CLI: `fetch`, `train` and `serve`.

mod commands;
mod config;

use clap::Parser;

use crate::config::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch(args) => commands::fetch(&args).await,
        Commands::Train(args) => {
            tokio::task::spawn_blocking(move || commands::train_model(&args)).await?
        }
        Commands::Serve(args) => commands::serve(&args).await,
    }
}
