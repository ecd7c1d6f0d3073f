//! Scan command: walk a receipt archive and merge new records.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use gelir_core::{
    CancelToken, GelirConfig, RecordExtractor, ScanPipeline, ScanProgress,
};

use crate::decoder::PdfTextDecoder;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Root directory of the receipt archive
    root: PathBuf,

    /// Discover and extract but do not modify the store
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: ScanArgs, store_path: &Path, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        GelirConfig::from_file(Path::new(path))?
    } else {
        GelirConfig::default()
    };

    let store = super::load_store(store_path)?;
    debug!(known = store.len(), "loaded record store");

    // Ctrl-C requests a graceful stop between documents
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("cancellation requested, finishing current document");
                cancel.cancel();
            }
        });
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    progress.set_message("discovering documents...");

    let pipeline = ScanPipeline::new(
        PdfTextDecoder,
        RecordExtractor::with_config(config.extraction.clone()),
        config.scan.clone(),
    );

    let root = args.root.clone();
    let bar = progress.clone();
    let cancel_for_run = cancel.clone();
    let (store, report) = tokio::task::spawn_blocking(move || {
        let mut run_store = store;
        let report = pipeline.run(&root, &mut run_store, &cancel_for_run, |event| match event {
            ScanProgress::Found { count, .. } => {
                bar.set_message(format!("discovering documents... {count} found"));
            }
            ScanProgress::Discovered { total } => {
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template(
                            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files",
                        )
                        .unwrap()
                        .progress_chars("=>-"),
                );
                bar.set_length(total as u64);
                bar.set_position(0);
            }
            ScanProgress::Processed { index, .. } => {
                bar.set_position(index as u64);
            }
        })?;
        Ok::<_, gelir_core::GelirError>((run_store, report))
    })
    .await??;

    progress.finish_and_clear();

    if args.dry_run {
        println!(
            "{} Dry run: found {} new documents ({} would need review)",
            style("ℹ").blue(),
            report.added,
            report.needs_review
        );
    } else {
        super::save_store(&store, store_path)?;
        println!(
            "{} Added {} records ({} stored total)",
            style("✓").green(),
            report.added,
            store.len()
        );
    }

    println!(
        "  processed: {}  ok: {}  decode failures: {}  needs review: {}",
        report.processed,
        report.succeeded,
        style(report.failed).red(),
        style(report.needs_review).yellow()
    );
    if report.cancelled {
        println!("{} Scan cancelled before completion", style("⚠").yellow());
    }
    println!("  finished in {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}
