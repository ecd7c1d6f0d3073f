//! CLI command implementations.

pub mod records;
pub mod scan;
pub mod stats;
pub mod transfer;

use std::path::{Path, PathBuf};

use anyhow::Context;
use gelir_core::RecordStore;

/// Resolve the record store path: explicit flag, `GELIR_STORE`, or the
/// platform data directory.
pub fn store_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(path) = std::env::var("GELIR_STORE") {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::data_dir().context("could not determine the user data directory")?;
    Ok(base.join("gelir").join("records.json"))
}

pub fn load_store(path: &Path) -> anyhow::Result<RecordStore> {
    RecordStore::load(path)
        .with_context(|| format!("failed to load record store from {}", path.display()))
}

pub fn save_store(store: &RecordStore, path: &Path) -> anyhow::Result<()> {
    store
        .save(path)
        .with_context(|| format!("failed to save record store to {}", path.display()))
}
