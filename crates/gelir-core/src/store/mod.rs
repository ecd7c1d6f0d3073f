//! JSON-persisted record store.
//!
//! The store is the single collection of extracted and manually entered
//! records. Persistence is one pretty-printed JSON array; saves go through
//! a temp file in the same directory so a crash never leaves a half-written
//! store behind.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::InvoiceRecord;

/// Sort orders for record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    DateAsc,
    DateDesc,
    AmountAsc,
    AmountDesc,
    ClientAsc,
    ClientDesc,
}

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<InvoiceRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`. A missing file is an empty store; a file
    /// that exists but does not parse is a hard error, never silently
    /// replaced.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "store file absent, starting empty");
            return Ok(Self::new());
        }
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        let mut records: Vec<InvoiceRecord> =
            serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        for record in &mut records {
            record.refresh_review_flag();
        }
        Ok(Self { records })
    }

    /// Save atomically: write a sibling temp file, then rename over the
    /// target.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, self.to_json_string()?)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), records = self.records.len(), "store saved");
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(&self.records)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Insert a record unless its id is already present. Returns whether
    /// the record was added.
    pub fn insert(&mut self, mut record: InvoiceRecord) -> bool {
        if self.contains(&record.id) {
            debug!(id = %record.id, "duplicate record ignored");
            return false;
        }
        record.refresh_review_flag();
        self.records.push(record);
        true
    }

    /// Insert every record, skipping duplicates. Returns how many were
    /// actually added.
    pub fn insert_all(&mut self, records: Vec<InvoiceRecord>) -> usize {
        let mut added = 0;
        for record in records {
            if self.insert(record) {
                added += 1;
            }
        }
        info!(added, total = self.records.len(), "records merged into store");
        added
    }

    /// Apply `edit` to the record with `id`. The review flag is rederived
    /// afterwards, so an edit that sets a real amount clears it.
    pub fn correct<F>(&mut self, id: &str, edit: F) -> Result<&InvoiceRecord, StoreError>
    where
        F: FnOnce(&mut InvoiceRecord),
    {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        edit(record);
        record.refresh_review_flag();
        Ok(record)
    }

    pub fn remove(&mut self, id: &str) -> Result<InvoiceRecord, StoreError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.records.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&InvoiceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    pub fn ids(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    pub fn records(&self) -> &[InvoiceRecord] {
        &self.records
    }

    /// Records newest first, ties broken by id for a stable listing.
    pub fn records_by_date_desc(&self) -> Vec<&InvoiceRecord> {
        self.records_sorted(SortOrder::DateDesc)
    }

    pub fn records_sorted(&self, order: SortOrder) -> Vec<&InvoiceRecord> {
        let mut sorted: Vec<&InvoiceRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| {
            let by = match order {
                SortOrder::DateAsc => a.date.cmp(&b.date),
                SortOrder::DateDesc => b.date.cmp(&a.date),
                SortOrder::AmountAsc => a.amount_usd.cmp(&b.amount_usd),
                SortOrder::AmountDesc => b.amount_usd.cmp(&a.amount_usd),
                SortOrder::ClientAsc => a.client.cmp(&b.client),
                SortOrder::ClientDesc => b.client.cmp(&a.client),
            };
            by.then_with(|| a.id.cmp(&b.id))
        });
        sorted
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
