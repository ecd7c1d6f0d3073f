//! Country canonicalization and extraction.
//!
//! The alias table maps codes, endonyms, and common variants to one
//! canonical English name per country. The canonical spellings are a
//! contract with the world-atlas `countries-110m` dataset used for
//! choropleth rendering downstream: consumers match by exact string
//! comparison, so this table is the single source of those spellings.

use regex::Regex;
use tracing::debug;

use super::patterns::{COUNTRY_CODE, COUNTRY_FULL_NAME, COUNTRY_REJECT};
use crate::models::NO_COUNTRY;

/// Alias -> canonical name. Keep sorted by country; both the code and the
/// endonym rows of a country must map to the same canonical spelling.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("USA", "United States"),
    ("United States of America", "United States"),
    ("GB", "United Kingdom"),
    ("UK", "United Kingdom"),
    ("DE", "Germany"),
    ("Deutschland", "Germany"),
    ("FR", "France"),
    ("NL", "Netherlands"),
    ("Holland", "Netherlands"),
    ("CH", "Switzerland"),
    ("Schweiz", "Switzerland"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("BE", "Belgium"),
    ("Belgique", "Belgium"),
    ("AT", "Austria"),
    ("Österreich", "Austria"),
    ("IE", "Ireland"),
    ("ES", "Spain"),
    ("España", "Spain"),
    ("IT", "Italy"),
    ("Italia", "Italy"),
    ("SE", "Sweden"),
    ("Sverige", "Sweden"),
    ("NO", "Norway"),
    ("Norge", "Norway"),
    ("DK", "Denmark"),
    ("Danmark", "Denmark"),
    ("FI", "Finland"),
    ("Suomi", "Finland"),
    ("PL", "Poland"),
    ("Polska", "Poland"),
    ("CZ", "Czech Republic"),
    ("Czech", "Czech Republic"),
    ("Czechia", "Czech Republic"),
    ("HU", "Hungary"),
    ("RO", "Romania"),
    ("BG", "Bulgaria"),
    ("GR", "Greece"),
    ("PT", "Portugal"),
    ("IN", "India"),
    ("CN", "China"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("Korea", "South Korea"),
    ("SG", "Singapore"),
    ("HK", "Hong Kong"),
    ("AE", "United Arab Emirates"),
    ("UAE", "United Arab Emirates"),
    ("Dubai", "United Arab Emirates"),
    ("SA", "Saudi Arabia"),
    ("IL", "Israel"),
    ("BR", "Brazil"),
    ("Brasil", "Brazil"),
    ("MX", "Mexico"),
    ("México", "Mexico"),
    ("AR", "Argentina"),
    ("CL", "Chile"),
    ("CO", "Colombia"),
    ("PE", "Peru"),
];

/// Canonical full names used for the substring containment fallback.
const CANONICAL_NAMES: &[&str] = &[
    "United States",
    "United Kingdom",
    "Germany",
    "France",
    "Netherlands",
    "Switzerland",
    "Canada",
    "Australia",
    "Belgium",
    "Austria",
    "Ireland",
    "Spain",
    "Italy",
    "Sweden",
    "Norway",
    "Denmark",
    "Finland",
    "Poland",
    "Czech Republic",
    "Hungary",
    "Romania",
    "Bulgaria",
    "Greece",
    "Portugal",
    "India",
    "China",
    "Japan",
    "South Korea",
    "Singapore",
    "Hong Kong",
    "United Arab Emirates",
    "Saudi Arabia",
    "Israel",
    "Brazil",
    "Mexico",
    "Argentina",
    "Chile",
    "Colombia",
    "Peru",
];

/// Map a raw country token to its canonical name.
///
/// Lookup order: exact alias hit, case-insensitive alias hit, bidirectional
/// substring containment against the canonical full names, then the trimmed
/// token unchanged (unknown-but-plausible tokens are preserved, not
/// discarded). Idempotent: canonical names map to themselves.
pub fn canonicalize(raw_token: &str) -> String {
    let trimmed = raw_token.trim();

    for (alias, canonical) in COUNTRY_ALIASES {
        if *alias == trimmed {
            return (*canonical).to_string();
        }
    }

    let lowered = trimmed.to_lowercase();
    for (alias, canonical) in COUNTRY_ALIASES {
        if alias.to_lowercase() == lowered {
            return (*canonical).to_string();
        }
    }

    for name in CANONICAL_NAMES {
        let name_lower = name.to_lowercase();
        if name_lower.contains(&lowered) || lowered.contains(&name_lower) {
            return (*name).to_string();
        }
    }

    trimmed.to_string()
}

/// Extract the client country from `text`.
///
/// Windows are searched in priority order, each one fully before the next:
/// the recipient block, a 300-char window after the located client
/// candidate, then the whole document. Returns [`NO_COUNTRY`] when no
/// window yields a plausible token; that sentinel never passes through
/// [`canonicalize`].
pub fn extract_country(
    text: &str,
    recipient_block: Option<&str>,
    client_raw: Option<&str>,
    labeled_rules: &[Regex],
) -> String {
    let mut windows = Vec::with_capacity(3);
    if let Some(block) = recipient_block {
        windows.push(block);
    }
    if let Some(window) = client_window(text, client_raw) {
        windows.push(window);
    }
    windows.push(text);

    for window in windows {
        if let Some(found) = search_window(window, labeled_rules) {
            return found;
        }
    }

    NO_COUNTRY.to_string()
}

fn client_window<'a>(text: &'a str, client_raw: Option<&str>) -> Option<&'a str> {
    let raw = client_raw?;
    let index = text.find(raw)?;
    let end = text[index..]
        .char_indices()
        .nth(300)
        .map(|(i, _)| index + i)
        .unwrap_or(text.len());
    Some(&text[index..end])
}

fn search_window(window: &str, labeled_rules: &[Regex]) -> Option<String> {
    for rule in labeled_rules {
        for caps in rule.captures_iter(window) {
            if let Some(found) = accept_candidate(&caps[1]) {
                return Some(found);
            }
        }
    }

    for caps in COUNTRY_FULL_NAME.captures_iter(window) {
        if let Some(found) = accept_candidate(&caps[1]) {
            return Some(found);
        }
    }

    for caps in COUNTRY_CODE.captures_iter(window) {
        if let Some(found) = accept_candidate(&caps[1]) {
            return Some(found);
        }
    }

    None
}

fn accept_candidate(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.chars().count() < 2 || COUNTRY_REJECT.is_match(candidate) {
        return None;
    }

    let canonical = canonicalize(candidate);
    debug!(raw = candidate, canonical = %canonical, "resolved country token");
    Some(canonical)
}
