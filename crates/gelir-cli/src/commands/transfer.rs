//! Export and import commands.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use console::style;

use gelir_core::RecordStore;

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Output file
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: ExportFormat,
}

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// JSON file produced by `gelir export`
    input: PathBuf,
}

pub fn export(args: ExportArgs, store_path: &Path) -> anyhow::Result<()> {
    let store = super::load_store(store_path)?;

    match args.format {
        ExportFormat::Json => {
            std::fs::write(&args.output, store.to_json_string()?)
                .with_context(|| format!("failed to write {}", args.output.display()))?;
        }
        ExportFormat::Csv => {
            let file = File::create(&args.output)
                .with_context(|| format!("failed to create {}", args.output.display()))?;
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record([
                "id",
                "date",
                "client",
                "country",
                "amount_usd",
                "amount_try",
                "description",
                "needs_review",
            ])?;
            for record in store.records_by_date_desc() {
                writer.write_record([
                    record.id.as_str(),
                    &record.date.to_string(),
                    record.client.as_str(),
                    record.country.as_str(),
                    &record.amount_usd.to_string(),
                    &record.amount_try.to_string(),
                    record.description.as_str(),
                    if record.needs_review { "yes" } else { "no" },
                ])?;
            }
            writer.flush()?;
        }
    }

    println!(
        "{} Exported {} records to {}",
        style("✓").green(),
        store.len(),
        args.output.display()
    );
    Ok(())
}

pub fn import(args: ImportArgs, store_path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let incoming = RecordStore::from_json_str(&raw)
        .with_context(|| format!("{} is not a valid export", args.input.display()))?;

    let mut store = super::load_store(store_path)?;
    let added = store.insert_all(incoming.records().to_vec());
    super::save_store(&store, store_path)?;

    println!(
        "{} Imported {} new records ({} duplicates skipped, {} stored total)",
        style("✓").green(),
        added,
        incoming.len() - added,
        store.len()
    );
    Ok(())
}
