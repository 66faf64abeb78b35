//! Active provider selection.

use anyhow::Result;
use colored::Colorize;

use crate::cli::{ProvidersAction, ProvidersCommand};
use crate::config::Config;
use crate::session;

pub async fn execute(cmd: ProvidersCommand, config: &Config) -> Result<()> {
    match cmd.action {
        ProvidersAction::List => list(config).await,
        ProvidersAction::Enable { provider } => {
            let orch = session::offline(config)?;
            if orch.activate(&provider)? {
                println!("{} Enabled {}", "✓".green(), provider);
            } else {
                println!("{} {} is already enabled", "○".yellow(), provider);
            }
            Ok(())
        }
        ProvidersAction::Disable { provider } => {
            let orch = session::offline(config)?;
            if orch.deactivate(&provider)? {
                println!("{} Disabled {}", "✓".green(), provider);
            } else {
                println!("{} {} is not enabled", "○".yellow(), provider);
            }
            Ok(())
        }
    }
}

async fn list(config: &Config) -> Result<()> {
    let orch = session::connect(config).await?;
    let catalog = orch.catalog()?;
    let active = orch.active_providers()?;

    for provider in catalog.iter() {
        let has_key = orch.credential(&provider.id)?.is_some();
        let marker = if active.contains(&provider.id) {
            "●".green()
        } else if has_key {
            "○".yellow()
        } else {
            "○".dimmed()
        };
        let model = orch
            .resolved_sub_model(&provider.id)?
            .unwrap_or_else(|| "-".to_string());
        let key = if has_key { "key stored".normal() } else { "no key".dimmed() };
        println!(
            "  {} {:<12} {:<20} {:<28} {}",
            marker, provider.id, provider.name, model, key
        );
    }

    // Active providers the service no longer offers
    for provider in active.iter().filter(|p| !catalog.contains(p)) {
        println!("  {} {:<12} {}", "●".red(), provider, "not offered by the service".red());
    }
    Ok(())
}
