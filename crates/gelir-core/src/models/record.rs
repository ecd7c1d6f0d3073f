//! Income record model for parsed e-SMM receipts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel client name when extraction found no candidate.
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// Sentinel country value when no country signal was found.
pub const NO_COUNTRY: &str = "-";

/// Source path marker for hand-entered records.
pub const MANUAL_SOURCE: &str = "manual";

/// One parsed receipt document (or a hand-entered record).
///
/// Records are created once by the extraction pipeline or by manual entry,
/// deduplicated by `id`, and only ever mutated through an explicit
/// correction. Aggregation reads never mutate records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Stable unique key: the document's embedded GIB serial number, or a
    /// generated fallback.
    pub id: String,

    /// Document date (ISO). Falls back to a date derived from the folder
    /// structure when the text carries no recognizable date.
    pub date: NaiveDate,

    /// Client name; [`UNKNOWN_CLIENT`] when not found.
    pub client: String,

    /// Canonical country name; [`NO_COUNTRY`] when undetermined.
    #[serde(default = "default_country")]
    pub country: String,

    /// Primary reporting amount in USD; zero means "not found".
    pub amount_usd: Decimal,

    /// Optional secondary amount in TRY; zero means absent.
    #[serde(default)]
    pub amount_try: Decimal,

    /// Service description.
    #[serde(default = "default_description")]
    pub description: String,

    /// Origin file path, or [`MANUAL_SOURCE`] for hand-entered records.
    pub source_path: String,

    /// True when extraction confidence is low and the record should be
    /// corrected by hand. Authoritative signal: the primary amount is zero.
    #[serde(default)]
    pub needs_review: bool,

    /// Ordered, human-readable extraction issues (non-fatal).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn default_country() -> String {
    NO_COUNTRY.to_string()
}

fn default_description() -> String {
    "Freelance Service".to_string()
}

impl InvoiceRecord {
    /// Create a hand-entered record, bypassing extraction.
    ///
    /// When `id` is `None` a `manual-<millis>` id is generated.
    pub fn manual(
        id: Option<String>,
        date: NaiveDate,
        client: impl Into<String>,
        description: Option<String>,
        amount_usd: Decimal,
        amount_try: Decimal,
    ) -> Self {
        let id = id.unwrap_or_else(|| {
            let millis = chrono::Utc::now().timestamp_millis();
            format!("manual-{millis}")
        });

        let mut record = Self {
            id,
            date,
            client: client.into(),
            country: default_country(),
            amount_usd,
            amount_try,
            description: description.unwrap_or_else(default_description),
            source_path: MANUAL_SOURCE.to_string(),
            needs_review: false,
            warnings: Vec::new(),
        };
        record.refresh_review_flag();
        record
    }

    /// Re-derive `needs_review` from the primary amount.
    ///
    /// Invariant: `needs_review == (amount_usd == 0)`.
    pub fn refresh_review_flag(&mut self) {
        self.needs_review = self.amount_usd.is_zero();
    }

    /// Year component of the record date.
    pub fn year(&self) -> i32 {
        use chrono::Datelike;
        self.date.year()
    }

    /// Month component of the record date (1-12).
    pub fn month(&self) -> u32 {
        use chrono::Datelike;
        self.date.month()
    }

    /// `YYYY-MM` grouping key.
    pub fn month_key(&self) -> String {
        format!("{}-{:02}", self.year(), self.month())
    }
}
