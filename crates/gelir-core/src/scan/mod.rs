//! Directory scanning and the sequential processing pipeline.
//!
//! Discovery walks the archive tree once, collecting candidate documents
//! and deduplicating them by id before any decoding happens. Processing
//! then decodes and extracts candidates one at a time, pacing itself so a
//! large archive does not saturate the machine.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::error::{DecodeError, GelirError, ScanError};
use crate::extract::RecordExtractor;
use crate::models::{InvoiceRecord, ScanConfig};
use crate::store::RecordStore;

/// Turns a document file into plain text.
///
/// Implementations live with the binaries; the pipeline itself never
/// touches a decoding library.
pub trait TextDecoder {
    fn decode(&self, path: &Path) -> Result<String, DecodeError>;
}

/// A document found during discovery, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,

    /// Id derived from the file name, used for dedup and as the record id
    /// when the document text carries no serial.
    pub id: String,

    /// Date derived from year and month tokens in the directory names,
    /// if any were present.
    pub folder_date: Option<NaiveDate>,
}

/// Progress events emitted by [`ScanPipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanProgress {
    /// A new candidate document turned up during discovery.
    Found { count: usize, path: PathBuf },
    /// Discovery finished; processing is about to start.
    Discovered { total: usize },
    /// One candidate was processed (successfully or not).
    Processed { index: usize, total: usize, path: PathBuf },
}

/// Cooperative cancellation flag, checked between documents.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Totals for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Candidates handed to the decoder.
    pub processed: usize,
    /// Records actually inserted into the store.
    pub added: usize,
    /// Records whose decode and extraction succeeded.
    pub succeeded: usize,
    /// Records built from a failed decode (sentinel records).
    pub failed: usize,
    /// Processed records still flagged for review.
    pub needs_review: usize,
    /// True when the run stopped on a cancellation request.
    pub cancelled: bool,
}

/// Walk `root` and collect candidate documents.
///
/// Only files whose name starts with the configured prefix (ASCII
/// case-insensitive) and carries the configured extension qualify. Ids
/// already in `existing_ids`, and ids seen earlier in the same walk, are
/// skipped here so duplicates never reach the decoder. Unreadable
/// subdirectories are logged and skipped; only an unreadable root fails
/// the scan. `on_found` fires once per accepted candidate.
pub fn discover(
    root: &Path,
    config: &ScanConfig,
    existing_ids: &HashSet<String>,
    on_found: &mut dyn FnMut(&CandidateFile),
) -> Result<Vec<CandidateFile>, GelirError> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()).into());
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()).into());
    }

    let mut seen: HashSet<String> = existing_ids.clone();
    let mut found = Vec::new();
    walk(root, root, config, 0, &mut seen, &mut found, on_found)?;

    found.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(root = %root.display(), candidates = found.len(), "discovery complete");
    Ok(found)
}

fn walk(
    root: &Path,
    dir: &Path,
    config: &ScanConfig,
    depth: usize,
    seen: &mut HashSet<String>,
    found: &mut Vec<CandidateFile>,
    on_found: &mut dyn FnMut(&CandidateFile),
) -> Result<(), GelirError> {
    if depth > config.max_depth {
        warn!(dir = %dir.display(), "maximum scan depth reached, not descending");
        return Ok(());
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) if dir == root => {
            return Err(ScanError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            }
            .into());
        }
        Err(source) => {
            warn!(dir = %dir.display(), error = %source, "skipping unreadable directory");
            return Ok(());
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                warn!(dir = %dir.display(), error = %source, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();

        if path.is_dir() {
            walk(root, &path, config, depth + 1, seen, found, on_found)?;
            continue;
        }

        if !matches_target(&path, config) {
            continue;
        }

        let id = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        if !seen.insert(id.clone()) {
            debug!(path = %path.display(), "skipping already known document");
            continue;
        }

        let folder_date = folder_date(root, &path);
        let candidate = CandidateFile {
            path,
            id,
            folder_date,
        };
        on_found(&candidate);
        found.push(candidate);
    }

    Ok(())
}

fn matches_target(path: &Path, config: &ScanConfig) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let prefix_ok = name
        .get(..config.file_prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(&config.file_prefix));

    prefix_ok && extension.eq_ignore_ascii_case(&config.file_extension)
}

/// Turkish month names, ASCII variants included, in calendar order.
const MONTH_NAMES: &[&[&str]] = &[
    &["ocak"],
    &["şubat", "subat"],
    &["mart"],
    &["nisan"],
    &["mayıs", "mayis"],
    &["haziran"],
    &["temmuz"],
    &["ağustos", "agustos"],
    &["eylül", "eylul"],
    &["ekim"],
    &["kasım", "kasim"],
    &["aralık", "aralik"],
];

/// Derive a fallback date from the directory names between `root` and the
/// file: the first four-digit year and, if present, a Turkish month name.
/// The day is pinned to the 15th since folders never carry one.
fn folder_date(root: &Path, path: &Path) -> Option<NaiveDate> {
    let relative = path.parent()?.strip_prefix(root).unwrap_or(path.parent()?);

    let mut year = None;
    let mut month = None;

    for component in relative.components() {
        let name = component.as_os_str().to_string_lossy().to_lowercase();

        if year.is_none() {
            if let Some(found) = extract_year(&name) {
                year = Some(found);
            }
        }
        if month.is_none() {
            for (index, variants) in MONTH_NAMES.iter().enumerate() {
                if variants.iter().any(|v| name.contains(v)) {
                    month = Some(index as u32 + 1);
                    break;
                }
            }
        }
    }

    if year.is_none() && month.is_none() {
        return None;
    }
    let year = year.unwrap_or_else(|| Utc::now().date_naive().year());
    NaiveDate::from_ymd_opt(year, month.unwrap_or(1), 15)
}

fn extract_year(name: &str) -> Option<i32> {
    let matched = crate::extract::rules::YEAR_TOKEN.find(name)?;
    matched.as_str().parse().ok()
}

/// Sequential scan pipeline: decode each candidate, extract a record,
/// pause periodically.
pub struct ScanPipeline<D: TextDecoder> {
    decoder: D,
    extractor: RecordExtractor,
    config: ScanConfig,
}

impl<D: TextDecoder> ScanPipeline<D> {
    pub fn new(decoder: D, extractor: RecordExtractor, config: ScanConfig) -> Self {
        Self {
            decoder,
            extractor,
            config,
        }
    }

    /// Process every candidate under `root` that is not already in `store`
    /// and insert the resulting records.
    ///
    /// A failed decode never aborts the run: the candidate becomes a
    /// sentinel record flagged for review, carrying the decode error as a
    /// warning. Cancellation is honored between documents, so the store is
    /// always consistent with the files fully processed so far.
    pub fn run(
        &self,
        root: &Path,
        store: &mut RecordStore,
        cancel: &CancelToken,
        mut progress: impl FnMut(ScanProgress),
    ) -> Result<ScanReport, GelirError> {
        let existing_ids = store.ids();
        let mut found_count = 0;
        let candidates = discover(root, &self.config, &existing_ids, &mut |candidate| {
            found_count += 1;
            progress(ScanProgress::Found {
                count: found_count,
                path: candidate.path.clone(),
            });
        })?;
        let total = candidates.len();
        progress(ScanProgress::Discovered { total });

        let mut report = ScanReport::default();

        for (index, candidate) in candidates.into_iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let started = Instant::now();
            let (mut record, decoded) = self.process_candidate(&candidate);
            report.processed += 1;
            if decoded {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
            if record.needs_review {
                report.needs_review += 1;
            }

            let elapsed = started.elapsed();
            if elapsed.as_secs() >= self.config.slow_file_warn_secs {
                warn!(
                    path = %candidate.path.display(),
                    seconds = elapsed.as_secs(),
                    "document took unusually long to process"
                );
                record
                    .warnings
                    .push(format!("processing took {}s", elapsed.as_secs()));
            }

            if store.insert(record) {
                report.added += 1;
            }
            progress(ScanProgress::Processed {
                index: index + 1,
                total,
                path: candidate.path,
            });

            // Breathe between batches so a big archive stays interactive.
            if self.config.pause_every > 0
                && report.processed % self.config.pause_every == 0
                && index + 1 < total
            {
                std::thread::sleep(Duration::from_millis(self.config.pause_ms));
            }
        }

        Ok(report)
    }

    fn process_candidate(&self, candidate: &CandidateFile) -> (InvoiceRecord, bool) {
        let fallback_date = candidate
            .folder_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let source_path = candidate.path.to_string_lossy().into_owned();

        match self.decoder.decode(&candidate.path) {
            Ok(text) => {
                let record =
                    self.extractor
                        .extract(&text, &candidate.id, fallback_date, &source_path);
                (record, true)
            }
            Err(error) => {
                warn!(path = %source_path, %error, "decode failed, storing sentinel record");
                // Extracting from empty text yields the sentinel values for
                // every field; only the warning list needs replacing.
                let mut record =
                    self.extractor
                        .extract("", &candidate.id, fallback_date, &source_path);
                record.warnings = vec![format!("decode failed: {error}")];
                (record, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_CLIENT;
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::io::Write as _;
    use tempfile::TempDir;

    struct FixedDecoder;

    impl TextDecoder for FixedDecoder {
        fn decode(&self, path: &Path) -> Result<String, DecodeError> {
            if path.to_string_lossy().contains("broken") {
                return Err(DecodeError::Decode("bad xref table".to_string()));
            }
            Ok("Düzenlenme Tarihi: 10/04/2024\nClient: Jane Roe\nToplam: 100,00 USD".to_string())
        }
    }

    fn touch(dir: &Path, name: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(b"x").unwrap();
    }

    fn pipeline() -> ScanPipeline<FixedDecoder> {
        ScanPipeline::new(
            FixedDecoder,
            RecordExtractor::default(),
            ScanConfig {
                pause_every: 0,
                ..ScanConfig::default()
            },
        )
    }

    fn discover_quiet(
        root: &Path,
        config: &ScanConfig,
        known: &HashSet<String>,
    ) -> Result<Vec<CandidateFile>, GelirError> {
        discover(root, config, known, &mut |_| {})
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "GIB2024b.pdf");
        touch(tmp.path(), "GIB2024a.pdf");
        touch(tmp.path(), "invoice.pdf");
        touch(tmp.path(), "GIB2024c.txt");

        let found = discover_quiet(tmp.path(), &ScanConfig::default(), &HashSet::new()).unwrap();
        let ids: Vec<_> = found.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["GIB2024a", "GIB2024b"]);
    }

    #[test]
    fn test_discover_prefix_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "gib2024lower.PDF");

        let found = discover_quiet(tmp.path(), &ScanConfig::default(), &HashSet::new()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "gib2024lower");
    }

    #[test]
    fn test_discover_dedups_against_known_ids() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "GIB2024a.pdf");
        touch(tmp.path(), "GIB2024b.pdf");

        let mut known = HashSet::new();
        known.insert("GIB2024a".to_string());

        let found = discover_quiet(tmp.path(), &ScanConfig::default(), &known).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "GIB2024b");
    }

    #[test]
    fn test_discover_missing_root() {
        let err = discover_quiet(
            Path::new("/no/such/dir"),
            &ScanConfig::default(),
            &HashSet::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GelirError::Scan(ScanError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_depth_cap() {
        let tmp = TempDir::new().unwrap();
        let mut deep = tmp.path().to_path_buf();
        for i in 0..3 {
            deep = deep.join(format!("level{i}"));
        }
        fs::create_dir_all(&deep).unwrap();
        touch(&deep, "GIB2024deep.pdf");

        let shallow = ScanConfig {
            max_depth: 1,
            ..ScanConfig::default()
        };
        let found = discover_quiet(tmp.path(), &shallow, &HashSet::new()).unwrap();
        assert!(found.is_empty());

        let found = discover_quiet(tmp.path(), &ScanConfig::default(), &HashSet::new()).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_folder_date_from_year_and_month() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("2024").join("Mayıs");
        fs::create_dir_all(&dir).unwrap();
        touch(&dir, "GIB2024x.pdf");

        let found = discover_quiet(tmp.path(), &ScanConfig::default(), &HashSet::new()).unwrap();
        assert_eq!(
            found[0].folder_date,
            Some(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap())
        );
    }

    #[test]
    fn test_folder_date_year_only_defaults_to_january() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("arsiv-2023");
        fs::create_dir_all(&dir).unwrap();
        touch(&dir, "GIB2023x.pdf");

        let found = discover_quiet(tmp.path(), &ScanConfig::default(), &HashSet::new()).unwrap();
        assert_eq!(
            found[0].folder_date,
            Some(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_pipeline_counts_and_sentinels() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "GIB2024ok.pdf");
        touch(tmp.path(), "GIB2024broken.pdf");

        let mut store = RecordStore::new();
        let report = pipeline()
            .run(tmp.path(), &mut store, &CancelToken::new(), |_| {})
            .unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.added, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.needs_review, 1);
        assert!(!report.cancelled);

        let broken = store.get("GIB2024broken").unwrap();
        assert!(broken.needs_review);
        assert_eq!(broken.client, UNKNOWN_CLIENT);
        assert!(broken.warnings[0].contains("bad xref table"));

        let ok = store.get("GIB2024ok").unwrap();
        assert_eq!(ok.client, "Jane Roe");
        assert!(!ok.needs_review);
    }

    #[test]
    fn test_pipeline_skips_known_records() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "GIB2024ok.pdf");

        let mut store = RecordStore::new();
        let first = pipeline()
            .run(tmp.path(), &mut store, &CancelToken::new(), |_| {})
            .unwrap();
        assert_eq!(first.added, 1);

        let second = pipeline()
            .run(tmp.path(), &mut store, &CancelToken::new(), |_| {})
            .unwrap();
        assert_eq!(second.processed, 0);
        assert_eq!(second.added, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_pipeline_cancelled_before_start() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "GIB2024ok.pdf");

        let cancel = CancelToken::new();
        cancel.cancel();

        let mut store = RecordStore::new();
        let report = pipeline()
            .run(tmp.path(), &mut store, &cancel, |_| {})
            .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.processed, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_progress_events() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "GIB2024a.pdf");

        let mut events = Vec::new();
        let mut store = RecordStore::new();
        pipeline()
            .run(tmp.path(), &mut store, &CancelToken::new(), |e| {
                events.push(e)
            })
            .unwrap();

        assert!(matches!(events[0], ScanProgress::Found { count: 1, .. }));
        assert_eq!(events[1], ScanProgress::Discovered { total: 1 });
        assert!(matches!(
            events[2],
            ScanProgress::Processed { index: 1, total: 1, .. }
        ));
    }
}
