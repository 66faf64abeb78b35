//! Diagnostics command.

use anyhow::Result;
use colored::Colorize;
use spectrum_core::AggregationService;

use crate::config::Config;
use crate::session;

pub async fn execute(config: &Config) -> Result<()> {
    println!("{}", "spectrum Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    let config_path = Config::config_path();
    if config_path.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check data directory
    print!("  Data directory: ");
    if config.paths.data_dir.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ will be created".yellow());
    }

    // Check state store
    print!("  State store: ");
    let orch = match session::offline(config) {
        Ok(orch) => {
            println!("{}", "✓ readable".green());
            Some(orch)
        }
        Err(e) => {
            println!("{}", format!("✗ {:#}", e).red());
            issues.push("State store not accessible");
            None
        }
    };

    // Check aggregation service
    print!("  Service ({}): ", config.api.url);
    let catalog = match session::client(config) {
        Ok(client) => client.list_models().await.ok(),
        Err(_) => None,
    };
    match &catalog {
        Some(catalog) => println!("{}", format!("✓ reachable, {} providers", catalog.len()).green()),
        None => {
            println!("{}", "✗ unreachable".red());
            issues.push("Cannot reach the aggregation service");
        }
    }

    // Check keys and active providers
    if let Some(orch) = &orch {
        let credentials = orch.credentials()?;
        let active = orch.active_providers()?;
        print!("  API keys: ");
        if credentials.is_empty() {
            println!("{}", "✗ none stored".red());
            issues.push("No API keys stored - run spectrum keys add <provider>");
        } else {
            println!("{}", format!("✓ {} stored", credentials.len()).green());
        }

        print!("  Active providers: ");
        if active.is_empty() {
            println!("{}", "✗ none".red());
            issues.push("No provider enabled - run spectrum providers enable <provider>");
        } else {
            println!("{}", active.join(", ").green());
        }

        if let Some(catalog) = &catalog {
            for provider in active.iter().filter(|p| !catalog.contains(p)) {
                println!("    {}", format!("○ {} is not offered by the service", provider).yellow());
            }
        }
    }

    // Summary
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in &issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}
