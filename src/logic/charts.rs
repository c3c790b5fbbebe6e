use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// The embedded-JSON shape the client chart widgets consume: parallel label
/// and value arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

/// Counts rows per key with deterministic (sorted) label order.
pub fn count_by<I, S>(keys: I) -> ChartSeries
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key.as_ref().to_string()).or_insert(0) += 1;
    }
    ChartSeries {
        labels: counts.keys().cloned().collect(),
        values: counts.values().copied().collect(),
    }
}

/// Counts rows per key in a caller-supplied label order; keys outside the
/// order are dropped. Used where the domain has a canonical ordering
/// (growth stages, request statuses) that alphabetical sorting would mangle.
pub fn count_by_ordered<I, S>(keys: I, order: &[&str]) -> ChartSeries
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<&str, i64> = order.iter().map(|l| (*l, 0)).collect();
    for key in keys {
        if let Some(slot) = counts.get_mut(key.as_ref()) {
            *slot += 1;
        }
    }
    ChartSeries {
        labels: order.iter().map(|l| l.to_string()).collect(),
        values: order.iter().map(|l| counts[l]).collect(),
    }
}

/// Twelve-bucket histogram of dates falling in `year`, labelled Jan..Dec.
pub fn monthly_histogram<'a, I>(dates: I, year: i32) -> ChartSeries
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let mut values = vec![0i64; 12];
    for date in dates {
        if date.year() == year {
            values[date.month0() as usize] += 1;
        }
    }
    ChartSeries {
        labels: MONTHS.iter().map(|m| m.to_string()).collect(),
        values,
    }
}
