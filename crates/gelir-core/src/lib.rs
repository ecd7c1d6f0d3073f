//! Core library for Turkish e-SMM receipt tracking.
//!
//! This crate provides:
//! - Rule-based field extraction from receipt text (serial, date, client,
//!   country, USD/TRY amounts, description)
//! - Directory scanning with id-level deduplication
//! - A JSON-persisted record store
//! - Pure aggregation over stored records (totals, groupings, trends)

pub mod error;
pub mod extract;
pub mod models;
pub mod scan;
pub mod stats;
pub mod store;

pub use error::{DecodeError, GelirError, Result, ScanError, StoreError};
pub use extract::rules::RuleSet;
pub use extract::RecordExtractor;
pub use models::{
    ExtractionConfig, GelirConfig, InvoiceRecord, ScanConfig, MANUAL_SOURCE, NO_COUNTRY,
    UNKNOWN_CLIENT,
};
pub use scan::{CancelToken, CandidateFile, ScanPipeline, ScanProgress, ScanReport, TextDecoder};
pub use stats::{aggregate, read_ratio, trend, AggregateView, PeriodFilter, Trend};
pub use store::{RecordStore, SortOrder};
