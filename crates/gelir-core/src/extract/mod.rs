//! Field extraction pipeline.
//!
//! Turns the raw text of one invoice document into an [`InvoiceRecord`].
//! Every field falls back to its sentinel instead of failing the document;
//! misses are reported through the record's `warnings` list.

pub mod rules;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::models::{ExtractionConfig, InvoiceRecord, UNKNOWN_CLIENT};
use rules::RuleSet;

/// Extracts all record fields from decoded document text.
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    rules: RuleSet,
    config: ExtractionConfig,
}

impl RecordExtractor {
    pub fn new(rules: RuleSet, config: ExtractionConfig) -> Self {
        Self { rules, config }
    }

    pub fn with_config(config: ExtractionConfig) -> Self {
        Self {
            rules: RuleSet::default(),
            config,
        }
    }

    /// Run every field extractor over `text` and assemble the record.
    ///
    /// `fallback_id` is used when the document carries no GIB serial;
    /// `fallback_date` when no date can be located. Both misses are
    /// recorded as warnings. A missing country is not: most foreign
    /// invoices simply omit it.
    pub fn extract(
        &self,
        text: &str,
        fallback_id: &str,
        fallback_date: NaiveDate,
        source_path: &str,
    ) -> InvoiceRecord {
        let mut warnings = Vec::new();

        let id = match rules::GIB_SERIAL.find(text) {
            Some(m) => m.as_str().to_string(),
            None => {
                warnings.push("document serial not found, using file-derived id".to_string());
                fallback_id.to_string()
            }
        };

        let date = match rules::extract_date(text, &self.rules.date_rules) {
            Some(date) => date,
            None => {
                warnings.push("date not found, using folder-derived date".to_string());
                fallback_date
            }
        };

        let client_match = rules::extract_client(text, &self.rules.client_rules, &self.config);
        let client = match &client_match {
            Some(m) => m.name.clone(),
            None => {
                warnings.push("client name not found".to_string());
                UNKNOWN_CLIENT.to_string()
            }
        };

        let country = rules::extract_country(
            text,
            rules::recipient_block(text, 500),
            client_match.as_ref().map(|m| m.raw.as_str()),
            &self.rules.country_rules,
        );

        let (amount_usd, tier) =
            rules::extract_amount_usd(text, &self.rules.usd_rules, &self.config);
        if amount_usd.is_zero() {
            warnings.push("USD amount not found".to_string());
        }
        let amount_try = rules::extract_amount_try(text, &self.rules.try_rules);

        let description = self.extract_description(text);

        debug!(
            id = %id,
            %date,
            client = %client,
            country = %country,
            %amount_usd,
            tier = ?tier,
            "extracted record fields"
        );

        let mut record = InvoiceRecord {
            id,
            date,
            client,
            country,
            amount_usd,
            amount_try,
            description,
            source_path: source_path.to_string(),
            needs_review: false,
            warnings,
        };
        record.refresh_review_flag();

        if record.needs_review {
            info!(id = %record.id, path = source_path, "record flagged for review");
        }
        record
    }

    fn extract_description(&self, text: &str) -> String {
        for rule in &self.rules.description_rules {
            if let Some(caps) = rule.captures(text) {
                let candidate = caps[1].trim();
                if candidate.chars().count() > 3 {
                    return truncate_chars(candidate, self.config.description_max_len);
                }
            }
        }
        self.config.default_description.clone()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((i, _)) => s[..i].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_COUNTRY;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn extractor() -> RecordExtractor {
        RecordExtractor::default()
    }

    fn fallback_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
    }

    #[test]
    fn test_full_document() {
        let text = "\
e-Serbest Meslek Makbuzu\n\
Belge No: GIB2024000012345\n\
Düzenlenme Tarihi: 15/03/2024\n\
ALICI BİLGİLERİ\n\
John Smith\n\
United States\n\
Mal/Hizmet Cinsi: Software consulting services\n\
Vergiler Dahil Toplam: 1.250,00 USD\n";

        let record = extractor().extract(text, "fallback-id", fallback_date(), "/tmp/a.pdf");

        assert_eq!(record.id, "GIB2024000012345");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(record.client, "John Smith");
        assert_eq!(record.country, "United States");
        assert_eq!(record.amount_usd, dec("1250.00"));
        assert_eq!(record.description, "Software consulting services");
        assert!(!record.needs_review);
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn test_empty_document_yields_sentinels() {
        let record = extractor().extract("", "fb-7", fallback_date(), "/tmp/b.pdf");

        assert_eq!(record.id, "fb-7");
        assert_eq!(record.date, fallback_date());
        assert_eq!(record.client, UNKNOWN_CLIENT);
        assert_eq!(record.country, NO_COUNTRY);
        assert_eq!(record.amount_usd, Decimal::ZERO);
        assert_eq!(record.description, "Freelance Service");
        assert!(record.needs_review);
        assert_eq!(record.warnings.len(), 4);
    }

    #[test]
    fn test_missing_country_is_not_a_warning() {
        let text = "\
GIB2024000012399\n\
Düzenlenme Tarihi: 01.02.2024\n\
Client: Acme Corp\n\
Toplam: 500,00 USD\n";

        let record = extractor().extract(text, "fb", fallback_date(), "/tmp/c.pdf");
        assert_eq!(record.client, "Acme Corp");
        assert_eq!(record.country, NO_COUNTRY);
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn test_zero_amount_flags_review() {
        let text = "GIB2024000012400\nDüzenlenme Tarihi: 01.02.2024\nClient: Acme Corp\n";
        let record = extractor().extract(text, "fb", fallback_date(), "/tmp/d.pdf");
        assert_eq!(record.amount_usd, Decimal::ZERO);
        assert!(record.needs_review);
        assert!(record.warnings.iter().any(|w| w.contains("USD amount")));
    }

    #[test]
    fn test_description_too_short_falls_back() {
        let text = "Açıklama: ab\nToplam: 100,00 USD\n";
        let record = extractor().extract(text, "fb", fallback_date(), "/tmp/e.pdf");
        assert_eq!(record.description, "Freelance Service");
    }
}
