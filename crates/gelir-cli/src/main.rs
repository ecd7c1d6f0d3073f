//! CLI application for tracking e-SMM freelance income.

mod commands;
mod decoder;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{records, scan, stats, transfer};

/// Track freelance income from Turkish e-SMM receipts
#[derive(Parser)]
#[command(name = "gelir")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to the record store file
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree for receipt documents
    Scan(scan::ScanArgs),

    /// Add a record by hand
    Add(records::AddArgs),

    /// List stored records
    List(records::ListArgs),

    /// Edit a stored record
    Edit(records::EditArgs),

    /// Remove a stored record
    Remove(records::RemoveArgs),

    /// Show income statistics
    Stats(stats::StatsArgs),

    /// Export records to JSON or CSV
    Export(transfer::ExportArgs),

    /// Import records from a JSON export
    Import(transfer::ImportArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let store_path = commands::store_path(cli.store)?;

    // Execute command
    match cli.command {
        Commands::Scan(args) => scan::run(args, &store_path, cli.config.as_deref()).await,
        Commands::Add(args) => records::add(args, &store_path),
        Commands::List(args) => records::list(args, &store_path),
        Commands::Edit(args) => records::edit(args, &store_path),
        Commands::Remove(args) => records::remove(args, &store_path),
        Commands::Stats(args) => stats::run(args, &store_path),
        Commands::Export(args) => transfer::export(args, &store_path),
        Commands::Import(args) => transfer::import(args, &store_path),
    }
}
