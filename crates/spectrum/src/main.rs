//! spectrum - ask several AI providers at once
//!
//! Command-line front end for the Spectrum aggregation service.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod render;
mod session;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing on stderr so answers stay clean on stdout
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("spectrum={level}").parse()?)
                .add_directive(format!("spectrum_core={level}").parse()?),
        )
        .init();

    // Load configuration
    let mut config = config::Config::load()?;
    if let Some(url) = cli.api_url {
        config.api.url = url;
    }
    debug!(
        "Config from {}, data dir {}",
        config::Config::config_path().display(),
        config.paths.data_dir.display()
    );

    // Execute command
    match cli.command {
        Commands::Models => commands::models::execute(&config).await,
        Commands::Keys(cmd) => commands::keys::execute(cmd, &config).await,
        Commands::Providers(cmd) => commands::providers::execute(cmd, &config).await,
        Commands::Ask(args) => commands::ask::execute(args, &config).await,
        Commands::Chat { summarize } => commands::chat::execute(summarize, &config).await,
        Commands::History => commands::history::execute(&config),
        Commands::Summary(cmd) => commands::summary::execute(cmd, &config),
        Commands::Config(cmd) => commands::config::execute(cmd, &config),
        Commands::Doctor => commands::doctor::execute(&config).await,
        Commands::Version => {
            println!("spectrum {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
