//! promptsmith - rewrite rough prompts into structured ones from the terminal

use std::io;

use anyhow::Result;
use clap::Parser as _;
use promptsmith_cli::config::{FileStore, Overrides};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

mod cli;
mod handlers;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries results and serve replies, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptsmith_cli=info,promptsmith_providers=info".into()),
        )
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let store = match cli.config {
        Some(path) => FileStore::new(path),
        None => FileStore::new(FileStore::default_path()?),
    };

    match cli.command {
        Commands::Optimize {
            prompt,
            provider,
            model,
            style,
            api_key,
        } => {
            let overrides = Overrides {
                provider,
                model,
                context_style: style,
                api_key,
            };
            handlers::handle_optimize(&store, prompt, overrides).await?;
        }
        Commands::Test => {
            handlers::handle_test(&store).await?;
        }
        Commands::Config { action } => {
            handlers::handle_config(&store, action)?;
        }
        Commands::Styles => {
            handlers::handle_styles(&store)?;
        }
        Commands::Languages => {
            handlers::handle_languages(&store)?;
        }
        Commands::Serve => {
            handlers::handle_serve(store).await?;
        }
    }

    Ok(())
}
