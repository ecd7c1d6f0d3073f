//! Amount extraction: locale-tolerant number parsing and the tiered
//! USD/TRY rules.

use rust_decimal::Decimal;
use std::str::FromStr;

use regex::Regex;

use crate::models::ExtractionConfig;

use super::patterns::{DECIMAL_TOKEN, NUMBER_TOKEN, USD_MARKER};

/// Parse a numeric literal with unknown separator convention.
///
/// Receipts mix Turkish formatting (`1.234,56`) with US formatting
/// (`1,234.56`); the relative position of the last `.` and last `,` decides
/// which character is the decimal separator. Returns zero when the cleaned
/// string does not parse: callers treat zero as "not found" and record a
/// warning instead of failing.
pub fn parse_amount(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // 1.234,56 - period is a thousands separator
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        // 1,234.56 - comma is a thousands separator
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // 548,33 - lone comma is the decimal separator
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}

/// Which evidence tier produced the primary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountTier {
    /// A labeled pattern matched.
    Labeled,
    /// A numeric token near the first currency marker.
    CurrencyWindow,
    /// Any `d+.dd` token in the whole document.
    DocumentSweep,
    /// Nothing found; the record needs review.
    NotFound,
}

/// Extract the primary USD amount via strictly ordered fallback tiers.
///
/// Each tier only runs when the previous one fully failed, because each is
/// strictly weaker evidence.
pub fn extract_amount_usd(
    text: &str,
    rules: &[Regex],
    config: &ExtractionConfig,
) -> (Decimal, AmountTier) {
    let max = Decimal::from(config.max_amount);

    // Tier 1: labeled patterns in precedence order
    for rule in rules {
        if let Some(caps) = rule.captures(text) {
            let parsed = parse_amount(&caps[1]);
            if parsed > Decimal::ZERO && parsed < max {
                return (parsed, AmountTier::Labeled);
            }
        }
    }

    // Tier 2: numeric tokens in a window around the first "USD" marker
    if let Some(found) = currency_window_amount(text, max) {
        return (found, AmountTier::CurrencyWindow);
    }

    // Tier 3: any d+.dd token in the document, tighter plausibility range
    let sweep_min = Decimal::from(config.sweep_min);
    let sweep_max = Decimal::from(config.sweep_max);
    for m in DECIMAL_TOKEN.find_iter(text) {
        let parsed = parse_amount(m.as_str());
        if parsed >= sweep_min && parsed <= sweep_max {
            return (parsed, AmountTier::DocumentSweep);
        }
    }

    (Decimal::ZERO, AmountTier::NotFound)
}

/// Scan numeric tokens within 100 characters on each side of the first
/// `USD` occurrence.
///
/// The marker is located case-insensitively on the original text so the
/// window offsets stay valid; uppercasing first would shift them on
/// Turkish text, where `ı` uppercases to the narrower `I`.
fn currency_window_amount(text: &str, max: Decimal) -> Option<Decimal> {
    let marker = USD_MARKER.find(text)?;

    let start = text[..marker.start()]
        .char_indices()
        .rev()
        .nth(99)
        .map_or(0, |(i, _)| i);
    let end = text[marker.start()..]
        .char_indices()
        .nth(100)
        .map_or(text.len(), |(i, _)| marker.start() + i);
    let window = &text[start..end];

    for m in NUMBER_TOKEN.find_iter(window) {
        let parsed = parse_amount(m.as_str());
        if parsed > Decimal::ZERO && parsed < max {
            return Some(parsed);
        }
    }
    None
}

/// Extract the optional secondary TRY amount. Absence is not a warning.
pub fn extract_amount_try(text: &str, rules: &[Regex]) -> Decimal {
    for rule in rules {
        if let Some(caps) = rule.captures(text) {
            let parsed = parse_amount(&caps[1]);
            if parsed > Decimal::ZERO {
                return parsed;
            }
        }
    }
    Decimal::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::rules::patterns::{TRY_LABELED, USD_LABELED};
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount_turkish_format() {
        assert_eq!(parse_amount("1.234,56"), dec("1234.56"));
        assert_eq!(parse_amount("12.345.678,90"), dec("12345678.90"));
    }

    #[test]
    fn test_parse_amount_us_format() {
        assert_eq!(parse_amount("1,234.56"), dec("1234.56"));
    }

    #[test]
    fn test_parse_amount_lone_comma() {
        assert_eq!(parse_amount("548,33"), dec("548.33"));
    }

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(parse_amount("1234.56"), dec("1234.56"));
        assert_eq!(parse_amount("1234"), dec("1234"));
    }

    #[test]
    fn test_parse_amount_garbage_is_zero() {
        assert_eq!(parse_amount("garbage"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount(",,..,,"), Decimal::ZERO);
    }

    #[test]
    fn test_labeled_tier_wins() {
        let text = "Hizmet Bedeli: 1.250,00 USD\nbalance 999.99";
        let (amount, tier) =
            extract_amount_usd(text, &USD_LABELED, &ExtractionConfig::default());
        assert_eq!(amount, dec("1250.00"));
        assert_eq!(tier, AmountTier::Labeled);
    }

    #[test]
    fn test_currency_window_tier() {
        // No labeled rule matches: the number precedes the marker with an
        // intervening word.
        let text = "total of 845,50 is due in USD currency";
        let (amount, tier) =
            extract_amount_usd(text, &USD_LABELED, &ExtractionConfig::default());
        assert_eq!(amount, dec("845.50"));
        assert_eq!(tier, AmountTier::CurrencyWindow);
    }

    #[test]
    fn test_currency_window_tier_on_dotless_i_text() {
        // A run of 'ı' before the marker must not shift the window: the
        // amount sits after "USD" and has to stay inside it.
        let text = format!(
            "{} total due in USD currency is exactly 845 dollars",
            "ı".repeat(90)
        );
        let (amount, tier) =
            extract_amount_usd(&text, &USD_LABELED, &ExtractionConfig::default());
        assert_eq!(amount, dec("845"));
        assert_eq!(tier, AmountTier::CurrencyWindow);
    }

    #[test]
    fn test_currency_window_measured_in_chars() {
        // 80 'ç' chars (160 bytes) between amount and marker: inside a
        // 100-char window, outside a 100-byte one.
        let text = format!("pay 512,40 {} in USD please", "ç".repeat(80));
        let (amount, tier) =
            extract_amount_usd(&text, &USD_LABELED, &ExtractionConfig::default());
        assert_eq!(amount, dec("512.40"));
        assert_eq!(tier, AmountTier::CurrencyWindow);
    }

    #[test]
    fn test_document_sweep_tier() {
        let text = "no currency marker anywhere, just 412,75 somewhere";
        let (amount, tier) =
            extract_amount_usd(text, &USD_LABELED, &ExtractionConfig::default());
        assert_eq!(amount, dec("412.75"));
        assert_eq!(tier, AmountTier::DocumentSweep);
    }

    #[test]
    fn test_not_found() {
        let (amount, tier) =
            extract_amount_usd("no numbers here", &USD_LABELED, &ExtractionConfig::default());
        assert_eq!(amount, Decimal::ZERO);
        assert_eq!(tier, AmountTier::NotFound);
    }

    #[test]
    fn test_out_of_range_labeled_rejected() {
        // 250000 exceeds the plausibility bound; the sweep then picks
        // nothing because there is no d+.dd token in range.
        let text = "Tutar: 250000 USD";
        let (amount, tier) =
            extract_amount_usd(text, &USD_LABELED, &ExtractionConfig::default());
        assert_eq!(amount, Decimal::ZERO);
        assert_eq!(tier, AmountTier::NotFound);
    }

    #[test]
    fn test_try_amount() {
        let text = "Net Alınan Toplam: 18.500,25 TL";
        assert_eq!(extract_amount_try(text, &TRY_LABELED), dec("18500.25"));
    }

    #[test]
    fn test_try_amount_absent() {
        assert_eq!(extract_amount_try("USD 100,00 only", &TRY_LABELED), Decimal::ZERO);
    }
}
