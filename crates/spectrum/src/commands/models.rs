//! Provider catalog listing.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::session;

pub async fn execute(config: &Config) -> Result<()> {
    let orch = session::connect(config).await?;
    let catalog = orch.catalog()?;

    if catalog.is_empty() {
        println!("{}", "No providers offered by the aggregation service.".yellow());
        return Ok(());
    }

    for provider in catalog.iter() {
        println!("{} {}", provider.name.cyan().bold(), format!("({})", provider.id).dimmed());
        if provider.models.is_empty() {
            println!("  {}", "no models listed".dimmed());
        }
        for (i, model) in provider.models.iter().enumerate() {
            let default = if i == 0 { " [default]".green().to_string() } else { String::new() };
            if model.description.is_empty() {
                println!("  {} {}{}", model.id, model.name.dimmed(), default);
            } else {
                println!(
                    "  {} {} - {}{}",
                    model.id,
                    model.name.dimmed(),
                    model.description.dimmed(),
                    default
                );
            }
        }
        if !provider.auth_url.is_empty() {
            println!("  {} {}", "keys:".dimmed(), provider.auth_url);
        }
        if !provider.docs_url.is_empty() {
            println!("  {} {}", "docs:".dimmed(), provider.docs_url);
        }
        println!();
    }

    Ok(())
}
