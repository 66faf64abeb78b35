//! One-shot query.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use spectrum_core::{ExportFormat, InsightOutcome, Orchestrator, RoundOutcome};

use crate::cli::AskArgs;
use crate::config::Config;
use crate::render;
use crate::session;

pub async fn execute(args: AskArgs, config: &Config) -> Result<()> {
    // Fail on a bad format before spending a round on it
    let export = args
        .export
        .as_deref()
        .map(str::parse::<ExportFormat>)
        .transpose()?;

    let orch = session::connect(config).await?;
    if args.summarize {
        orch.override_synthesis(Some(true))?;
    }

    let outcome = run_round(&orch, RoundRequest::Submit(&args.query_text()), None).await?;
    if outcome.report().is_some_and(|r| r.is_failure()) {
        bail!("No response from the aggregation service; run the command again to retry");
    }

    if args.insights {
        run_insights(&orch).await?;
    }
    if let Some(format) = export {
        run_export(&orch, format, config).await?;
    }
    Ok(())
}

pub enum RoundRequest<'a> {
    Submit(&'a str),
    FollowUp(&'a str),
    Retry,
}

/// Run a round behind a spinner and print the displayed result.
pub async fn run_round(
    orch: &Orchestrator,
    request: RoundRequest<'_>,
    retry_hint: Option<&str>,
) -> Result<RoundOutcome> {
    let providers = orch.active_providers()?.len();
    let spinner = render::spinner(&format!("Asking {} providers...", providers));
    let result = match request {
        RoundRequest::Submit(query) => orch.submit(query).await,
        RoundRequest::FollowUp(query) => orch.follow_up(query).await,
        RoundRequest::Retry => orch.retry().await,
    };
    spinner.finish_and_clear();
    let outcome = result?;

    if let RoundOutcome::Complete(report) = &outcome {
        render::print_aggregate(&orch.catalog()?, &orch.aggregate()?);
        render::print_report(report, retry_hint);
    }
    Ok(outcome)
}

pub async fn run_insights(orch: &Orchestrator) -> Result<()> {
    let spinner = render::spinner("Generating insights...");
    let result = orch.request_insights().await;
    spinner.finish_and_clear();

    match result? {
        InsightOutcome::Synthesized { .. } => {
            if let Some(synthesis) = orch.aggregate()?.synthesis() {
                println!();
                render::print_synthesis(synthesis);
            }
        }
        InsightOutcome::Stale => {
            println!("{} Insights discarded: a newer query replaced the results", "○".yellow());
        }
    }
    Ok(())
}

pub async fn run_export(orch: &Orchestrator, format: ExportFormat, config: &Config) -> Result<()> {
    let spinner = render::spinner(&format!("Exporting as {}...", format));
    let result = orch.request_export(format).await;
    spinner.finish_and_clear();

    let artifact = result?;
    let path = artifact
        .write_to(&config.paths.export_dir())
        .context("Failed to write export")?;
    println!(
        "{} Exported {} to {}",
        "✓".green(),
        artifact.content_type.dimmed(),
        path.display()
    );
    Ok(())
}
