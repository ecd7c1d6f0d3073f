//! Record management commands: add, list, edit, remove.

use std::path::Path;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use console::style;
use rust_decimal::Decimal;

use gelir_core::{InvoiceRecord, PeriodFilter, SortOrder};

#[derive(Clone, Copy, ValueEnum)]
pub enum SortKey {
    DateAsc,
    DateDesc,
    AmountAsc,
    AmountDesc,
    ClientAsc,
    ClientDesc,
}

impl From<SortKey> for SortOrder {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::DateAsc => SortOrder::DateAsc,
            SortKey::DateDesc => SortOrder::DateDesc,
            SortKey::AmountAsc => SortOrder::AmountAsc,
            SortKey::AmountDesc => SortOrder::AmountDesc,
            SortKey::ClientAsc => SortOrder::ClientAsc,
            SortKey::ClientDesc => SortOrder::ClientDesc,
        }
    }
}

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Record date (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,

    /// Client name
    #[arg(long)]
    client: String,

    /// Amount in USD
    #[arg(long)]
    amount_usd: Decimal,

    /// Amount in TRY
    #[arg(long, default_value = "0")]
    amount_try: Decimal,

    /// Service description
    #[arg(long)]
    description: Option<String>,

    /// Explicit record id (a manual id is generated otherwise)
    #[arg(long)]
    id: Option<String>,
}

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Sort order
    #[arg(long, value_enum, default_value = "date-desc")]
    sort: SortKey,

    /// Restrict to one year
    #[arg(long)]
    year: Option<i32>,

    /// Restrict to one month (requires --year)
    #[arg(long, requires = "year")]
    month: Option<u32>,

    /// Only show records flagged for review
    #[arg(long)]
    review: bool,
}

/// Arguments for the edit command.
#[derive(Args)]
pub struct EditArgs {
    /// Id of the record to edit
    id: String,

    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    client: Option<String>,

    #[arg(long)]
    country: Option<String>,

    #[arg(long)]
    amount_usd: Option<Decimal>,

    #[arg(long)]
    amount_try: Option<Decimal>,

    #[arg(long)]
    description: Option<String>,
}

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Id of the record to remove
    id: String,
}

pub fn add(args: AddArgs, store_path: &Path) -> anyhow::Result<()> {
    let mut store = super::load_store(store_path)?;

    let record = InvoiceRecord::manual(
        args.id,
        args.date,
        args.client,
        args.description,
        args.amount_usd,
        args.amount_try,
    );
    let id = record.id.clone();

    if !store.insert(record) {
        anyhow::bail!("a record with id {id} already exists");
    }
    super::save_store(&store, store_path)?;

    println!("{} Added record {}", style("✓").green(), style(id).bold());
    Ok(())
}

pub fn list(args: ListArgs, store_path: &Path) -> anyhow::Result<()> {
    let store = super::load_store(store_path)?;

    let filter = PeriodFilter {
        year: args.year,
        month: args.month,
    };

    let records: Vec<_> = store
        .records_sorted(args.sort.into())
        .into_iter()
        .filter(|r| filter.matches(r) && (!args.review || r.needs_review))
        .collect();

    if records.is_empty() {
        println!("No matching records.");
        return Ok(());
    }

    for record in &records {
        let flag = if record.needs_review {
            style("review").yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}  {}  {:>12} USD  {:<25} {:<20} {}",
            record.date,
            style(&record.id).bold(),
            record.amount_usd,
            record.client,
            record.country,
            flag
        );
    }
    println!("{} records", records.len());
    Ok(())
}

pub fn edit(args: EditArgs, store_path: &Path) -> anyhow::Result<()> {
    let mut store = super::load_store(store_path)?;

    let updated = store.correct(&args.id, |record| {
        if let Some(date) = args.date {
            record.date = date;
        }
        if let Some(client) = args.client {
            record.client = client;
        }
        if let Some(country) = args.country {
            record.country = country;
        }
        if let Some(amount) = args.amount_usd {
            record.amount_usd = amount;
        }
        if let Some(amount) = args.amount_try {
            record.amount_try = amount;
        }
        if let Some(description) = args.description {
            record.description = description;
        }
    })?;

    let still_flagged = updated.needs_review;
    super::save_store(&store, store_path)?;

    println!("{} Updated record {}", style("✓").green(), style(&args.id).bold());
    if still_flagged {
        println!(
            "{} Record still has a zero USD amount and stays flagged for review",
            style("⚠").yellow()
        );
    }
    Ok(())
}

pub fn remove(args: RemoveArgs, store_path: &Path) -> anyhow::Result<()> {
    let mut store = super::load_store(store_path)?;
    let removed = store.remove(&args.id)?;
    super::save_store(&store, store_path)?;

    println!(
        "{} Removed record {} ({}, {} USD)",
        style("✓").green(),
        style(removed.id).bold(),
        removed.client,
        removed.amount_usd
    );
    Ok(())
}
