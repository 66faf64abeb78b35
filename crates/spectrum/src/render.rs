//! Terminal rendering of rounds, syntheses and progress.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use spectrum_core::{
    ProviderCatalog, ProviderErrorKind, ResponseAggregate, ResponseSlot, RoundReport, SlotState,
};
use std::time::Duration;

/// Steady-ticking spinner on stderr.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// `Display Name (sub-model)` heading for a slot.
pub fn slot_heading(catalog: &ProviderCatalog, slot: &ResponseSlot) -> String {
    let name = catalog.display_name(&slot.provider);
    let model = match &slot.state {
        SlotState::Success { sub_model, .. } => sub_model.as_deref(),
        _ => slot.requested_model.as_deref(),
    };
    match model {
        Some(model) => format!("{} ({})", name, model),
        None => name.to_string(),
    }
}

/// Error line with its display category.
pub fn error_line(message: &str) -> String {
    let kind = ProviderErrorKind::classify(message);
    format!("{} [{}] {}", message, kind, kind.hint())
}

pub fn print_slot(catalog: &ProviderCatalog, slot: &ResponseSlot) {
    let heading = slot_heading(catalog, slot);
    match &slot.state {
        SlotState::Success { content, .. } => {
            println!("{} {}", "✓".green(), heading.bold());
            println!("{}", "─".repeat(50).dimmed());
            println!("{}", content.trim_end());
            println!();
        }
        SlotState::Error { message } => {
            println!("{} {}", "✗".red(), heading.bold());
            println!("  {}", error_line(message).red());
            println!();
        }
        SlotState::Pending => {
            println!("{} {} {}", "…".yellow(), heading.bold(), "pending".dimmed());
        }
        SlotState::Vacant => {
            println!(
                "{} {} {}",
                "○".dimmed(),
                heading.dimmed(),
                "not queried (no model available)".dimmed()
            );
        }
    }
}

pub fn print_synthesis(state: &SlotState) {
    match state {
        SlotState::Success { content, sub_model } => {
            let title = match sub_model {
                Some(model) => format!("Insights ({})", model),
                None => "Insights".to_string(),
            };
            println!("{} {}", "◆".magenta(), title.magenta().bold());
            println!("{}", "─".repeat(50).dimmed());
            println!("{}", content.trim_end());
            println!();
        }
        SlotState::Error { message } => {
            println!("{} {}", "✗".red(), "Insights".bold());
            println!("  {}", message.red());
            println!();
        }
        SlotState::Pending => println!("{} {}", "…".yellow(), "Insights pending".dimmed()),
        SlotState::Vacant => {}
    }
}

/// Every slot in active order, then the synthesis if one is displayed.
pub fn print_aggregate(catalog: &ProviderCatalog, aggregate: &ResponseAggregate) {
    println!();
    for slot in aggregate.slots() {
        print_slot(catalog, slot);
    }
    if let Some(synthesis) = aggregate.synthesis() {
        print_synthesis(synthesis);
    }
}

/// One-line outcome of a round. `retry_hint` names the retry command, if the
/// caller offers one.
pub fn print_report(report: &RoundReport, retry_hint: Option<&str>) {
    if let Some(failure) = &report.failure {
        println!("{} Request failed: {}", "✗".red(), failure);
        if let Some(hint) = retry_hint {
            println!("  Retry with {}", hint.cyan());
        }
        return;
    }
    println!("{} {}", "→".cyan(), report_summary(report).dimmed());
}

fn report_summary(report: &RoundReport) -> String {
    let mut summary = format!(
        "{} succeeded, {} failed",
        report.succeeded.len(),
        report.failed.len() + report.missing.len()
    );
    if !report.missing.is_empty() {
        summary.push_str(&format!(" (no response from {})", report.missing.join(", ")));
    }
    summary
}
