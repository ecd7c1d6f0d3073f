//! Date extraction for e-SMM receipts.

use chrono::NaiveDate;
use regex::Regex;

use super::patterns::{DATE_BARE_DMY, DATE_BARE_YMD, DATE_LABELED_DMY};

/// Digit ordering of a date rule's capture groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// Captures are (day, month, year).
    DayFirst,
    /// Captures are (year, month, day).
    YearFirst,
}

/// One candidate date rule: a pattern plus its capture ordering.
#[derive(Debug, Clone)]
pub struct DateRule {
    pub pattern: Regex,
    pub order: DateOrder,
}

/// The tuned date rule table: labeled day-first rules, then the bare
/// day-first form, then the bare year-first form.
pub fn default_date_rules() -> Vec<DateRule> {
    let mut rules: Vec<DateRule> = DATE_LABELED_DMY
        .iter()
        .map(|pattern| DateRule {
            pattern: pattern.clone(),
            order: DateOrder::DayFirst,
        })
        .collect();

    rules.push(DateRule {
        pattern: DATE_BARE_DMY.clone(),
        order: DateOrder::DayFirst,
    });
    rules.push(DateRule {
        pattern: DATE_BARE_YMD.clone(),
        order: DateOrder::YearFirst,
    });
    rules
}

/// Try each rule in order; the first match that forms a real calendar date
/// wins. Invalid dates (e.g. 45/13/2024 caught by a bare pattern) are
/// rejected and the next rule is tried.
pub fn extract_date(text: &str, rules: &[DateRule]) -> Option<NaiveDate> {
    for rule in rules {
        for caps in rule.pattern.captures_iter(text) {
            let (year, month, day) = match rule.order {
                DateOrder::DayFirst => (&caps[3], &caps[2], &caps[1]),
                DateOrder::YearFirst => (&caps[1], &caps[2], &caps[3]),
            };

            let year: i32 = year.parse().unwrap_or(0);
            let month: u32 = month.parse().unwrap_or(0);
            let day: u32 = day.parse().unwrap_or(0);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }
    None
}
