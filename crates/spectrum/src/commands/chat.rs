//! Interactive session.
//!
//! The first line is a top-level query; later lines are follow-ups on the
//! displayed results until `:new` starts over.

use anyhow::Result;
use colored::Colorize;
use spectrum_core::{Error, ExportFormat, Orchestrator};
use std::io::{self, BufRead, Write};

use super::ask::{run_export, run_insights, run_round, RoundRequest};
use crate::config::Config;
use crate::session;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatInput {
    Query(String),
    Retry,
    Insights,
    Export(String),
    New,
    History,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatInput::Empty;
        }
        let Some(command) = line.strip_prefix(':') else {
            return ChatInput::Query(line.to_string());
        };

        let mut parts = command.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();
        match name {
            "retry" | "r" => ChatInput::Retry,
            "insights" | "i" => ChatInput::Insights,
            "export" | "e" => ChatInput::Export(arg.to_string()),
            "new" | "n" => ChatInput::New,
            "history" | "h" => ChatInput::History,
            "help" | "?" => ChatInput::Help,
            "quit" | "q" | "exit" => ChatInput::Quit,
            other => ChatInput::Unknown(other.to_string()),
        }
    }
}

pub async fn execute(summarize: bool, config: &Config) -> Result<()> {
    let orch = session::connect(config).await?;
    if summarize {
        orch.override_synthesis(Some(true))?;
    }

    let active = orch.active_providers()?;
    if active.is_empty() {
        println!("{}", "No providers enabled.".yellow());
        println!("  Add a key with {}", "spectrum keys add <provider>".cyan());
        return Ok(());
    }
    println!(
        "{} Asking {}. Type {} for commands.",
        "→".cyan(),
        active.join(", ").bold(),
        ":help".cyan()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut follow_up = false;

    loop {
        let prompt = if follow_up { "follow-up> " } else { "ask> " };
        print!("{}", prompt.cyan().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };

        match ChatInput::parse(&line?) {
            ChatInput::Empty => {}
            ChatInput::Quit => break,
            ChatInput::Help => print_help(),
            ChatInput::New => {
                follow_up = false;
                println!("{} Next line starts a new query", "→".cyan());
            }
            ChatInput::History => print_history(&orch)?,
            ChatInput::Unknown(name) => {
                println!("{} Unknown command :{} (try :help)", "✗".red(), name);
            }
            ChatInput::Query(text) => {
                let request = if follow_up {
                    RoundRequest::FollowUp(&text)
                } else {
                    RoundRequest::Submit(&text)
                };
                if report_error(run_round(&orch, request, Some(":retry")).await) {
                    follow_up = true;
                }
            }
            ChatInput::Retry => {
                report_error(run_round(&orch, RoundRequest::Retry, Some(":retry")).await);
            }
            ChatInput::Insights => {
                report_error(run_insights(&orch).await);
            }
            ChatInput::Export(format) => match format.parse::<ExportFormat>() {
                Ok(format) => {
                    report_error(run_export(&orch, format, config).await);
                }
                Err(_) => println!(
                    "{} Usage: :export json|markdown|csv",
                    "✗".red()
                ),
            },
        }
    }

    Ok(())
}

/// Print a failed action and keep the session going. Returns whether it succeeded.
fn report_error<T>(result: Result<T>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            let guard = e
                .downcast_ref::<Error>()
                .is_some_and(Error::is_guard_rejection);
            if guard {
                println!("{} {}", "○".yellow(), e);
            } else {
                println!("{} {:#}", "✗".red(), e);
            }
            false
        }
    }
}

fn print_history(orch: &Orchestrator) -> Result<()> {
    let history = orch.history()?;
    if history.is_empty() {
        println!("{}", "No queries yet.".dimmed());
    }
    for record in history {
        let local = record.timestamp.with_timezone(&chrono::Local);
        println!("  {} {}", local.format("%Y-%m-%d %H:%M").to_string().dimmed(), record.query);
    }
    Ok(())
}

fn print_help() {
    println!("  {:<18} ask (first line) or follow up on the results", "<text>");
    println!("  {:<18} resubmit the displayed query", ":retry");
    println!("  {:<18} synthesize the successful answers", ":insights");
    println!("  {:<18} export as json, markdown or csv", ":export <format>");
    println!("  {:<18} start a new top-level query", ":new");
    println!("  {:<18} show recent queries", ":history");
    println!("  {:<18} leave", ":quit");
}
