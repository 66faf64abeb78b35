//! API key management.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::Password;
use spectrum_core::{Error, ProviderDescriptor};

use crate::cli::{KeysAction, KeysCommand};
use crate::config::Config;
use crate::session;

pub async fn execute(cmd: KeysCommand, config: &Config) -> Result<()> {
    match cmd.action {
        KeysAction::Add { provider, key, model } => add(&provider, key, model, config).await,
        KeysAction::List => list(config),
        KeysAction::Remove { provider } => remove(&provider, config),
        KeysAction::Model { provider, model } => select_model(&provider, &model, config).await,
    }
}

async fn add(
    provider: &str,
    key: Option<String>,
    model: Option<String>,
    config: &Config,
) -> Result<()> {
    let orch = session::connect(config).await?;
    let catalog = orch.catalog()?;
    let Some(descriptor) = catalog.get(provider) else {
        bail!(
            "Unknown provider '{}'. Run {} to see available providers.",
            provider,
            "spectrum models".cyan()
        );
    };
    // Reject a bad model before anything is stored
    if let Some(model) = &model {
        check_sub_model(descriptor, model)?;
    }

    let key = match key {
        Some(key) => key,
        None => Password::new()
            .with_prompt(format!("{} API key", descriptor.name))
            .interact()
            .context("Failed to read API key")?,
    };

    println!("{} Validating {} key...", "→".cyan(), descriptor.name);
    orch.register_credential(provider, &key).await?;

    if let Some(model) = model {
        orch.select_sub_model(provider, &model)?;
    }

    let masked = orch
        .credential(provider)?
        .map(|c| c.masked())
        .unwrap_or_default();
    let model = orch.resolved_sub_model(provider)?.unwrap_or_else(|| "-".to_string());
    println!(
        "{} Stored {} key {} (model {}), provider enabled",
        "✓".green(),
        descriptor.name,
        masked.dimmed(),
        model
    );
    Ok(())
}

fn list(config: &Config) -> Result<()> {
    let orch = session::offline(config)?;
    let credentials = orch.credentials()?;
    let active = orch.active_providers()?;

    if credentials.is_empty() {
        println!("{}", "No API keys stored.".yellow());
        println!("  Add one with {}", "spectrum keys add <provider>".cyan());
        return Ok(());
    }

    for credential in &credentials {
        let status = if active.contains(&credential.provider) {
            "active".green()
        } else {
            "inactive".dimmed()
        };
        let model = credential.sub_model.as_deref().unwrap_or("default");
        println!(
            "  {:<12} {:<24} {:<28} {}",
            credential.provider,
            credential.masked(),
            model,
            status
        );
    }
    Ok(())
}

fn remove(provider: &str, config: &Config) -> Result<()> {
    let orch = session::offline(config)?;
    if orch.remove_credential(provider)? {
        println!("{} Removed {} key and disabled the provider", "✓".green(), provider);
    } else {
        println!("{} No key stored for {}", "○".yellow(), provider);
    }
    Ok(())
}

fn check_sub_model(descriptor: &ProviderDescriptor, model: &str) -> spectrum_core::Result<()> {
    if descriptor.has_sub_model(model) {
        Ok(())
    } else {
        Err(Error::UnknownSubModel {
            provider: descriptor.id.clone(),
            model: model.to_string(),
        })
    }
}

async fn select_model(provider: &str, model: &str, config: &Config) -> Result<()> {
    let orch = session::connect(config).await?;
    orch.select_sub_model(provider, model)?;
    println!("{} {} will use {}", "✓".green(), provider, model.cyan());
    Ok(())
}
