//! Client name extraction.
//!
//! Three stages, strongest evidence first: the labeled recipient block of
//! the GIB template, labeled name fields, and finally a capitalized
//! word-pair sweep over the whole document. The stage heuristics are tuned
//! against the e-SMM template family and marketplace (Upwork/Fiverr)
//! receipts.

use regex::Regex;

use crate::models::ExtractionConfig;

use super::patterns::{
    ADDRESS_TOKEN, CLIENT_INVALID_START, CLIENT_LABEL_PREFIX, CLIENT_NAME_SWEEP, FISCAL_TOKEN,
    HAS_LETTER_RUN, NAME_STOPLIST, RECIPIENT_HEADER, RECIPIENT_LABEL_LINE, TRAILING_GEO_TOKEN,
};

/// A located client name.
#[derive(Debug, Clone)]
pub struct ClientMatch {
    /// Cleaned name, truncated to the configured token count.
    pub name: String,

    /// The full cleaned candidate before truncation. Used to anchor the
    /// country search window.
    pub raw: String,
}

/// The recipient text block, when the document carries one.
///
/// Returns the slice starting at the `ALICI BİLGİLERİ` header, capped at
/// `max_len` characters.
pub fn recipient_block(text: &str, max_len: usize) -> Option<&str> {
    let m = RECIPIENT_HEADER.find(text)?;
    let start = m.start();
    let end = text[start..]
        .char_indices()
        .nth(max_len)
        .map(|(i, _)| start + i)
        .unwrap_or(text.len());
    Some(&text[start..end])
}

/// Extract the client name, or `None` when every stage failed.
pub fn extract_client(
    text: &str,
    labeled_rules: &[Regex],
    config: &ExtractionConfig,
) -> Option<ClientMatch> {
    let raw = candidate_from_recipient_block(text)
        .or_else(|| candidate_from_labeled_rules(text, labeled_rules))
        .or_else(|| candidate_from_name_sweep(text))?;

    let name = truncate_name(&raw, config);
    if name.chars().count() < 2 {
        return None;
    }
    Some(ClientMatch { name, raw })
}

/// Stage 1: first plausible line inside the recipient block.
fn candidate_from_recipient_block(text: &str) -> Option<String> {
    let block = recipient_block(text, 200)?;

    for line in block.lines() {
        let mut cleaned = line.trim();
        if let Some(m) = RECIPIENT_HEADER.find(cleaned) {
            if m.start() == 0 {
                cleaned = &cleaned[m.end()..];
            }
        }
        let cleaned = strip_label_prefixes(cleaned);

        if cleaned.chars().count() > 3
            && HAS_LETTER_RUN.is_match(&cleaned)
            && !RECIPIENT_LABEL_LINE.is_match(&cleaned)
        {
            return Some(cleaned);
        }
    }
    None
}

/// Stage 2: labeled name fields, in precedence order.
fn candidate_from_labeled_rules(text: &str, rules: &[Regex]) -> Option<String> {
    for rule in rules {
        if let Some(caps) = rule.captures(text) {
            let candidate = normalize_whitespace(caps[1].trim());
            let candidate = strip_label_prefixes(&candidate);
            if candidate.chars().count() > 2 && !CLIENT_INVALID_START.is_match(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Stage 3: capitalized word pairs on their own line, filtered by the
/// platform/location stoplist.
fn candidate_from_name_sweep(text: &str) -> Option<String> {
    for caps in CLIENT_NAME_SWEEP.captures_iter(text) {
        let candidate = caps[1].trim();
        let words: Vec<&str> = candidate.split_whitespace().collect();

        let valid = words.len() >= 2
            && words
                .iter()
                .all(|w| w.chars().count() >= 2 && !NAME_STOPLIST.contains(w))
            && !candidate.chars().any(|c| c.is_ascii_digit());

        if valid {
            return Some(candidate.to_string());
        }
    }
    None
}

/// Keep at most `max_client_tokens` leading tokens, stopping early at
/// digits, street vocabulary, fiscal vocabulary, and (after two name
/// words) trailing geography.
fn truncate_name(raw: &str, config: &ExtractionConfig) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for word in raw.split_whitespace() {
        if word.starts_with(|c: char| c.is_ascii_digit()) || ADDRESS_TOKEN.is_match(word) {
            break;
        }
        if kept.len() >= 2 && TRAILING_GEO_TOKEN.is_match(word) {
            break;
        }
        if FISCAL_TOKEN.is_match(word) {
            break;
        }
        kept.push(word);
        if kept.len() >= config.max_client_tokens {
            break;
        }
    }

    kept.join(" ")
}

/// Strip leading label fragments and separators left over from the
/// template ("BİLGİLERİ", a stray dotted `i`, colons).
fn strip_label_prefixes(candidate: &str) -> String {
    let mut cleaned = candidate.trim().to_string();

    loop {
        let stripped = CLIENT_LABEL_PREFIX.replace(&cleaned, "").into_owned();
        let stripped = stripped.trim_start_matches([':', ' ', '\t']).to_string();
        if stripped == cleaned {
            break;
        }
        cleaned = stripped;
    }

    // A lone leading 'i' is the tail of a split "BİLGİLERİ"
    let mut chars = cleaned.chars();
    if let Some(first) = chars.next() {
        if matches!(first, 'i' | 'İ' | 'ı' | 'I') && chars.next() == Some(' ') {
            cleaned = cleaned[first.len_utf8() + 1..].trim_start().to_string();
        }
    }

    cleaned.trim().to_string()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::rules::patterns::CLIENT_LABELED;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> Option<String> {
        extract_client(text, &CLIENT_LABELED, &ExtractionConfig::default()).map(|m| m.name)
    }

    #[test]
    fn test_recipient_block_name() {
        let text = "ALICI BİLGİLERİ\nJohn Smith\n123 Main Street\nUnited States";
        assert_eq!(extract(text), Some("John Smith".to_string()));
    }

    #[test]
    fn test_recipient_block_skips_labels() {
        let text = "ALICI BİLGİLERİ\nVKN: 1234567890\nAdı Soyadı: ignored\nAcme Corporation GmbH";
        assert_eq!(extract(text), Some("Acme Corporation GmbH".to_string()));
    }

    #[test]
    fn test_labeled_name_field() {
        let text = "Makbuz\nMüşteri: Jane Doe\nTutar: 100 USD";
        assert_eq!(extract(text), Some("Jane Doe".to_string()));
    }

    #[test]
    fn test_name_sweep_respects_stoplist() {
        // The sweep iterates all word-pair matches and drops stoplisted
        // and digit-bearing candidates.
        let text = "Freelance Service\nOrder 12\nMaria Gonzalez";
        assert_eq!(
            candidate_from_name_sweep(text),
            Some("Maria Gonzalez".to_string())
        );
    }

    #[test]
    fn test_truncation_stops_at_address() {
        let text = "ALICI BİLGİLERİ\nJohn Smith 123 Main Street Springfield";
        assert_eq!(extract(text), Some("John Smith".to_string()));
    }

    #[test]
    fn test_truncation_stops_at_trailing_geo() {
        let text = "ALICI BİLGİLERİ\nJohn Ronald Smith United Kingdom";
        assert_eq!(extract(text), Some("John Ronald Smith".to_string()));
    }

    #[test]
    fn test_max_four_tokens() {
        let text = "ALICI BİLGİLERİ\nAlpha Beta Gamma Delta Epsilon Zeta";
        assert_eq!(extract(text), Some("Alpha Beta Gamma Delta".to_string()));
    }

    #[test]
    fn test_no_client() {
        assert_eq!(extract("1234 5678\n9999"), None);
    }
}
