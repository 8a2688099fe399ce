//! Ledger reports and job bookkeeping: `summary`, `roi`, `revenue`, `notes`.

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use clap::Subcommand;

use poolquote_core::ledger::LedgerSummary;
use poolquote_core::{Command, Money};

use crate::context::AppContext;

#[derive(Debug, Subcommand)]
pub enum RevenueCommand {
    /// Record revenue from a completed job
    Add {
        amount: Money,
        /// Job date (YYYY-MM-DD), defaults to now
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub async fn summary(ctx: &AppContext) -> Result<()> {
    let summary = ctx
        .workspace
        .read(|state| state.snapshot.sections.summary())
        .await;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &LedgerSummary) {
    println!(
        "Items: {} ({} verified), verified spend {}",
        summary.overall.count, summary.overall.verified_count, summary.overall.total
    );
    println!("  One-time: {}", summary.one_time_total);
    println!("  Per-job:  {}", summary.per_job_total);
    println!();
    println!("By section");
    for (section, aggregate) in &summary.by_section {
        println!(
            "  {:<10} {:>3} items {:>3} verified {:>12}",
            section.as_str(),
            aggregate.count,
            aggregate.verified_count,
            aggregate.total.to_string()
        );
    }
    println!("By category");
    for (category, aggregate) in &summary.by_category {
        println!(
            "  {:<10} {:>3} items {:>3} verified {:>12}",
            category.as_str(),
            aggregate.count,
            aggregate.verified_count,
            aggregate.total.to_string()
        );
    }
}

pub async fn roi(ctx: &AppContext) -> Result<()> {
    let report = ctx.workspace.read(|state| state.roi()).await;
    println!("Revenue:            {}", report.total_revenue);
    println!("Jobs completed:     {}", report.jobs_completed);
    println!("Initial investment: {}", report.initial_investment);
    println!("Net profit:         {}", report.net_profit);
    println!("ROI:                {}", report.roi_label());
    Ok(())
}

pub async fn revenue(ctx: &AppContext, command: RevenueCommand) -> Result<()> {
    match command {
        RevenueCommand::Add { amount, date } => {
            let date = match date.and_then(|d| d.and_hms_opt(12, 0, 0)) {
                Some(naive) => Utc.from_utc_datetime(&naive),
                None => Utc::now(),
            };
            ctx.workspace
                .dispatch(Command::RecordRevenue { amount, date })
                .await?;
            println!("Recorded {} on {}", amount, date.format("%Y-%m-%d"));
        }
    }
    Ok(())
}

/// Prints the project notes, or replaces them when `text` is given.
pub async fn notes(ctx: &AppContext, text: Option<String>) -> Result<()> {
    match text {
        Some(text) => {
            ctx.workspace
                .dispatch(Command::SetProjectNotes(text))
                .await?;
        }
        None => {
            let notes = ctx
                .workspace
                .read(|state| state.snapshot.project_notes.clone())
                .await;
            println!("{}", notes);
        }
    }
    Ok(())
}
