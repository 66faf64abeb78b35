//! Recent query listing.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::session;

pub fn execute(config: &Config) -> Result<()> {
    let orch = session::offline(config)?;
    let history = orch.history()?;

    if history.is_empty() {
        println!("{}", "No queries yet.".yellow());
        return Ok(());
    }

    for (i, record) in history.iter().enumerate() {
        let local = record.timestamp.with_timezone(&chrono::Local);
        println!(
            "  {:>2}. {} {}",
            i + 1,
            local.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            record.query
        );
    }
    Ok(())
}
