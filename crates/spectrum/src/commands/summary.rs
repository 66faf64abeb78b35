//! Inline summary setting.

use anyhow::Result;
use colored::Colorize;

use crate::cli::{SummaryAction, SummaryCommand};
use crate::config::Config;
use crate::session;

pub fn execute(cmd: SummaryCommand, config: &Config) -> Result<()> {
    let orch = session::offline(config)?;
    match cmd.action {
        SummaryAction::On => {
            orch.set_synthesis_enabled(true)?;
            println!("{} Inline summaries enabled", "✓".green());
        }
        SummaryAction::Off => {
            orch.set_synthesis_enabled(false)?;
            println!("{} Inline summaries disabled", "✓".green());
        }
        SummaryAction::Status => {
            let status = if orch.synthesis_enabled()? { "on".green() } else { "off".yellow() };
            println!("Inline summaries: {}", status);
        }
    }
    Ok(())
}
