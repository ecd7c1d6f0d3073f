//! Stats command: income dashboard over the stored records.

use std::path::Path;

use chrono::Datelike;
use clap::Args;
use console::style;

use gelir_core::{aggregate, read_ratio, trend, PeriodFilter};

/// Arguments for the stats command.
#[derive(Args)]
pub struct StatsArgs {
    /// Restrict to one year
    #[arg(long)]
    year: Option<i32>,

    /// Restrict to one month (requires --year)
    #[arg(long, requires = "year")]
    month: Option<u32>,

    /// Print the aggregate as JSON instead of a dashboard
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatsArgs, store_path: &Path) -> anyhow::Result<()> {
    let store = super::load_store(store_path)?;
    let records = store.records();

    let filter = PeriodFilter {
        year: args.year,
        month: args.month,
    };
    let view = aggregate(records, filter);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.count == 0 {
        println!("No records match.");
        return Ok(());
    }

    println!("{}", style("Income summary").bold().underlined());
    println!("  records:      {}", view.count);
    println!("  total USD:    {}", style(view.total_usd).green());
    if !view.total_try.is_zero() {
        println!("  total TRY:    {}", view.total_try);
    }
    println!("  avg USD:      {}", view.avg_usd.round_dp(2));
    let (read, total) = read_ratio(records);
    println!("  amounts read: {read}/{total}");
    if view.needs_review > 0 {
        println!(
            "  needs review: {} ({:.0}%)",
            style(view.needs_review).yellow(),
            view.needs_review as f64 / view.count as f64 * 100.0
        );
    }

    println!("\n{}", style("By year").bold());
    for (year, totals) in &view.by_year {
        println!("  {year}: {:>12} USD  ({} records)", totals.total_usd, totals.count);
    }

    println!("\n{}", style("By client").bold());
    for (client, total) in &view.by_client {
        println!("  {client:<30} {total:>12} USD");
    }

    println!("\n{}", style("By country").bold());
    for (country, total) in &view.by_country {
        println!("  {country:<30} {total:>12} USD");
    }

    // Trend for the requested month, or the latest month on record
    let (trend_year, trend_month) = match (args.year, args.month) {
        (Some(y), Some(m)) => (y, m),
        _ => match records.iter().map(|r| r.date).max() {
            Some(latest) => (latest.year(), latest.month()),
            None => return Ok(()),
        },
    };

    match trend(records, trend_year, trend_month) {
        Some(t) => {
            let arrow = if t.change_pct.is_sign_negative() {
                style("▼").red()
            } else {
                style("▲").green()
            };
            println!(
                "\n{} {trend_year}-{trend_month:02}: {} USD, {arrow} {}% vs previous month",
                style("Trend").bold(),
                t.current,
                t.change_pct.round_dp(1)
            );
        }
        None => {
            println!(
                "\n{} no trend for {trend_year}-{trend_month:02}: previous month has no income",
                style("Trend").bold()
            );
        }
    }

    Ok(())
}
