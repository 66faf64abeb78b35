//! Configuration commands.

use anyhow::Result;
use colored::Colorize;

use crate::cli::{ConfigAction, ConfigCommand};
use crate::config::Config;

pub fn execute(cmd: ConfigCommand, config: &Config) -> Result<()> {
    match cmd.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }
        ConfigAction::Init { force } => {
            let path = Config::config_path();
            if path.exists() && !force {
                println!(
                    "{} Config already exists at {} (use --force to overwrite)",
                    "○".yellow(),
                    path.display()
                );
                return Ok(());
            }
            let path = Config::default().save()?;
            println!("{} Wrote {}", "✓".green(), path.display());
        }
    }
    Ok(())
}
