//! Rule-based field extractors for freelance service invoices.

pub mod amounts;
pub mod client;
pub mod country;
pub mod dates;
pub mod patterns;

pub use amounts::{extract_amount_try, extract_amount_usd, parse_amount, AmountTier};
pub use client::{extract_client, recipient_block, ClientMatch};
pub use country::{canonicalize, extract_country};
pub use dates::{default_date_rules, extract_date, DateOrder, DateRule};
pub use patterns::*;

use regex::Regex;

/// The complete, ordered rule tables driving one extraction run.
///
/// Defaults clone the compiled tables in [`patterns`]; rule order is
/// precedence, earlier rules win. Callers replace a field's table wholesale
/// to customize it, the pipeline never reorders.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub date_rules: Vec<DateRule>,
    pub client_rules: Vec<Regex>,
    pub country_rules: Vec<Regex>,
    pub usd_rules: Vec<Regex>,
    pub try_rules: Vec<Regex>,
    pub description_rules: Vec<Regex>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            date_rules: default_date_rules(),
            client_rules: CLIENT_LABELED.clone(),
            country_rules: COUNTRY_LABELED.clone(),
            usd_rules: USD_LABELED.clone(),
            try_rules: TRY_LABELED.clone(),
            description_rules: DESCRIPTION_LABELED.clone(),
        }
    }
}
