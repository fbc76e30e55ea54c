//! Read-only summaries over journal snapshots.
//!
//! # Responsibility
//! - Derive totals and breakdowns for charts and dashboard tiles.
//!
//! # Invariants
//! - Every function is pure over the given slice; nothing here touches a store.
//! - Period membership uses each record's `date`, never `created_at`.
//! - Category maps are `BTreeMap`s so iteration order is stable for rendering.

use crate::model::record::Record;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Date window used to filter records before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Month { year: i32, month: u32 },
    Year(i32),
    /// Inclusive on both ends.
    Range { from: NaiveDate, to: NaiveDate },
}

impl Period {
    /// Calendar month containing `reference`.
    pub fn month_of(reference: NaiveDate) -> Self {
        Self::Month {
            year: reference.year(),
            month: reference.month(),
        }
    }

    pub fn year_of(reference: NaiveDate) -> Self {
        Self::Year(reference.year())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Self::All => true,
            Self::Month { year, month } => date.year() == year && date.month() == month,
            Self::Year(year) => date.year() == year,
            Self::Range { from, to } => from <= date && date <= to,
        }
    }
}

/// Cost and entry count for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total_cost: f64,
    pub entries: usize,
}

/// Dashboard summary relative to a reference date.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalSummary {
    pub reference_date: NaiveDate,
    pub month_total: f64,
    pub month_entries: usize,
    pub all_time_total: f64,
    pub total_entries: usize,
    pub month_by_category: BTreeMap<String, f64>,
    pub all_time_by_category: BTreeMap<String, f64>,
}

fn in_period(records: &[Record], period: Period) -> impl Iterator<Item = &Record> {
    records
        .iter()
        .filter(move |record| period.contains(record.date))
}

/// Sum of `cost` for records inside `period`.
pub fn total_cost(records: &[Record], period: Period) -> f64 {
    in_period(records, period).map(|record| record.cost).sum()
}

pub fn count_entries(records: &[Record], period: Period) -> usize {
    in_period(records, period).count()
}

/// Cost per category for records inside `period`.
pub fn cost_by_category(records: &[Record], period: Period) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for record in in_period(records, period) {
        *totals.entry(record.category.clone()).or_insert(0.0) += record.cost;
    }
    totals
}

pub fn count_by_category(records: &[Record], period: Period) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in in_period(records, period) {
        *counts.entry(record.category.clone()).or_insert(0) += 1;
    }
    counts
}

/// Per-month totals in chronological order. Months without entries are omitted.
pub fn totals_by_month(records: &[Record]) -> Vec<MonthlyTotal> {
    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for record in records {
        let bucket = buckets
            .entry((record.date.year(), record.date.month()))
            .or_insert((0.0, 0));
        bucket.0 += record.cost;
        bucket.1 += 1;
    }
    buckets
        .into_iter()
        .map(|((year, month), (total_cost, entries))| MonthlyTotal {
            year,
            month,
            total_cost,
            entries,
        })
        .collect()
}

/// Builds the "this month vs all time" summary for `reference_date`.
pub fn summarize(records: &[Record], reference_date: NaiveDate) -> JournalSummary {
    let month = Period::month_of(reference_date);
    JournalSummary {
        reference_date,
        month_total: total_cost(records, month),
        month_entries: count_entries(records, month),
        all_time_total: total_cost(records, Period::All),
        total_entries: records.len(),
        month_by_category: cost_by_category(records, month),
        all_time_by_category: cost_by_category(records, Period::All),
    }
}
