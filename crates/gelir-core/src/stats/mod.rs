//! Aggregation over stored records.
//!
//! All functions here are pure reads: they take a record slice and produce
//! totals, never touching the store. Grouping maps are ordered so reports
//! and serialized output come out deterministic.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::InvoiceRecord;

/// Optional year/month narrowing applied before aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl PeriodFilter {
    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            month: None,
        }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
        }
    }

    pub fn matches(&self, record: &InvoiceRecord) -> bool {
        self.year.is_none_or(|y| record.year() == y)
            && self.month.is_none_or(|m| record.month() == m)
    }
}

/// Totals for one calendar year, with a month breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearTotals {
    pub total_usd: Decimal,
    pub count: usize,
    /// Keyed by month number (1-12).
    pub by_month: BTreeMap<u32, Decimal>,
}

/// Full aggregate over a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateView {
    pub count: usize,
    pub total_usd: Decimal,
    pub total_try: Decimal,
    /// Mean USD amount per record; zero for an empty set.
    pub avg_usd: Decimal,
    /// Records still carrying the review flag.
    pub needs_review: usize,
    pub by_year: BTreeMap<i32, YearTotals>,
    /// Keyed by `YYYY-MM`.
    pub by_month: BTreeMap<String, Decimal>,
    pub by_client: BTreeMap<String, Decimal>,
    pub by_country: BTreeMap<String, Decimal>,
}

/// Month-over-month movement of the USD total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trend {
    pub current: Decimal,
    pub previous: Decimal,
    /// Percent change from the previous period.
    pub change_pct: Decimal,
}

/// Aggregate `records`, restricted to `filter`.
pub fn aggregate(records: &[InvoiceRecord], filter: PeriodFilter) -> AggregateView {
    let mut view = AggregateView::default();

    for record in records.iter().filter(|r| filter.matches(r)) {
        view.count += 1;
        view.total_usd += record.amount_usd;
        view.total_try += record.amount_try;
        if record.needs_review {
            view.needs_review += 1;
        }

        let year = view.by_year.entry(record.year()).or_default();
        year.total_usd += record.amount_usd;
        year.count += 1;
        *year.by_month.entry(record.month()).or_default() += record.amount_usd;

        *view.by_month.entry(record.month_key()).or_default() += record.amount_usd;
        *view.by_client.entry(record.client.clone()).or_default() += record.amount_usd;
        *view.by_country.entry(record.country.clone()).or_default() += record.amount_usd;
    }

    if view.count > 0 {
        view.avg_usd = view.total_usd / Decimal::from(view.count);
    }
    view
}

/// The dashboard's "read / total" counter: how many records carry a real
/// amount, out of how many are stored.
pub fn read_ratio(records: &[InvoiceRecord]) -> (usize, usize) {
    let read = records.iter().filter(|r| !r.amount_usd.is_zero()).count();
    (read, records.len())
}

/// Month-over-month trend for the given month.
///
/// `None` when the previous month's total is zero: a percent change from
/// nothing is meaningless, not infinite. January compares against December
/// of the prior year.
pub fn trend(records: &[InvoiceRecord], year: i32, month: u32) -> Option<Trend> {
    let (prev_year, prev_month) = if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };

    let current = month_total(records, year, month);
    let previous = month_total(records, prev_year, prev_month);

    if previous.is_zero() {
        return None;
    }

    let change_pct = (current - previous) / previous * Decimal::from(100);
    Some(Trend {
        current,
        previous,
        change_pct,
    })
}

fn month_total(records: &[InvoiceRecord], year: i32, month: u32) -> Decimal {
    records
        .iter()
        .filter(|r| r.year() == year && r.month() == month)
        .map(|r| r.amount_usd)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn record(id: &str, date: (i32, u32, u32), client: &str, country: &str, usd: &str) -> InvoiceRecord {
        let mut r = InvoiceRecord {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            client: client.to_string(),
            country: country.to_string(),
            amount_usd: Decimal::from_str(usd).unwrap(),
            amount_try: Decimal::ZERO,
            description: "Freelance Service".to_string(),
            source_path: String::new(),
            needs_review: false,
            warnings: Vec::new(),
        };
        r.refresh_review_flag();
        r
    }

    fn sample() -> Vec<InvoiceRecord> {
        vec![
            record("a", (2024, 1, 10), "Acme Corp", "Germany", "1000"),
            record("b", (2024, 1, 20), "Acme Corp", "Germany", "500"),
            record("c", (2024, 2, 5), "Jane Roe", "United States", "2000"),
            record("d", (2023, 12, 1), "Jane Roe", "United States", "400"),
            record("e", (2024, 2, 9), "Unknown", "-", "0"),
        ]
    }

    #[test]
    fn test_totals_and_groupings() {
        let view = aggregate(&sample(), PeriodFilter::default());

        assert_eq!(view.count, 5);
        assert_eq!(view.total_usd, Decimal::from(3900));
        assert_eq!(view.needs_review, 1);

        assert_eq!(view.by_client["Acme Corp"], Decimal::from(1500));
        assert_eq!(view.by_country["United States"], Decimal::from(2400));
        assert_eq!(view.by_month["2024-01"], Decimal::from(1500));

        let y2024 = &view.by_year[&2024];
        assert_eq!(y2024.total_usd, Decimal::from(3500));
        assert_eq!(y2024.count, 4);
        assert_eq!(y2024.by_month[&2], Decimal::from(2000));
    }

    #[test]
    fn test_group_totals_sum_to_overall() {
        let view = aggregate(&sample(), PeriodFilter::default());
        let client_sum: Decimal = view.by_client.values().copied().sum();
        let country_sum: Decimal = view.by_country.values().copied().sum();
        assert_eq!(client_sum, view.total_usd);
        assert_eq!(country_sum, view.total_usd);
    }

    #[test]
    fn test_period_filter() {
        let view = aggregate(&sample(), PeriodFilter::year(2024));
        assert_eq!(view.count, 4);
        assert_eq!(view.total_usd, Decimal::from(3500));

        let view = aggregate(&sample(), PeriodFilter::month(2024, 1));
        assert_eq!(view.count, 2);
        assert_eq!(view.total_usd, Decimal::from(1500));
    }

    #[test]
    fn test_average() {
        let view = aggregate(&sample(), PeriodFilter::month(2024, 1));
        assert_eq!(view.avg_usd, Decimal::from(750));

        let empty = aggregate(&[], PeriodFilter::default());
        assert_eq!(empty.avg_usd, Decimal::ZERO);
    }

    #[test]
    fn test_trend_basic() {
        let t = trend(&sample(), 2024, 2).unwrap();
        assert_eq!(t.current, Decimal::from(2000));
        assert_eq!(t.previous, Decimal::from(1500));
        assert_eq!(t.change_pct.round_dp(2), Decimal::from_str("33.33").unwrap());
    }

    #[test]
    fn test_trend_year_rollover() {
        let t = trend(&sample(), 2024, 1).unwrap();
        assert_eq!(t.previous, Decimal::from(400));
        assert_eq!(t.current, Decimal::from(1500));
        assert_eq!(t.change_pct, Decimal::from(275));
    }

    #[test]
    fn test_trend_zero_previous_is_none() {
        assert!(trend(&sample(), 2023, 12).is_none());
    }

    #[test]
    fn test_aggregate_is_pure() {
        let records = sample();
        let before = records.clone();
        let _ = aggregate(&records, PeriodFilter::default());
        for (a, b) in records.iter().zip(before.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.amount_usd, b.amount_usd);
            assert_eq!(a.needs_review, b.needs_review);
        }
    }

    #[test]
    fn test_read_ratio() {
        assert_eq!(read_ratio(&[]), (0, 0));
        assert_eq!(read_ratio(&sample()), (4, 5));
    }
}
