//! Data models for income records and configuration.

pub mod config;
pub mod record;

pub use config::{ExtractionConfig, GelirConfig, ScanConfig};
pub use record::{InvoiceRecord, MANUAL_SOURCE, NO_COUNTRY, UNKNOWN_CLIENT};
