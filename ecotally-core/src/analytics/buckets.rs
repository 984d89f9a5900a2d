//! Recency buckets for bar charts.
//!
//! Records are grouped into fixed windows (the last 7 days, the last 12
//! months, or every year from the earliest record to now) and summed into
//! two parallel series. For transactions the series are income and expense;
//! for carbon activities they are offsets (negative impact, as a positive
//! magnitude) and emissions.
//!
//! Every bucket in the window is present even when nothing falls into it.
//! Records outside the window are ignored, so the sum over all buckets equals
//! the sum over the in-window records.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;

use super::Clock;
use crate::types::{ActivityRecord, TransactionKind, TransactionRecord, UsageLogRecord};

/// Number of daily buckets in a week chart.
pub const WEEK_DAYS: u64 = 7;
/// Number of monthly buckets in a month chart.
pub const YEAR_MONTHS: u32 = 12;

/// Time window of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartRange {
    /// Seven daily buckets ending today, keyed `YYYY-MM-DD`
    Week,
    /// Twelve monthly buckets ending this month, keyed `MMM YY`
    Month,
    /// One bucket per year from the earliest record, keyed `YYYY`
    Year,
}

impl ChartRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::Week => "week",
            ChartRange::Month => "month",
            ChartRange::Year => "year",
        }
    }

    /// Bucket key for a calendar day under this range.
    pub fn key(&self, day: NaiveDate) -> String {
        match self {
            ChartRange::Week => day.format("%Y-%m-%d").to_string(),
            ChartRange::Month => day.format("%b %y").to_string(),
            ChartRange::Year => day.year().to_string(),
        }
    }
}

impl std::str::FromStr for ChartRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" | "weekly" => Ok(ChartRange::Week),
            "month" | "monthly" => Ok(ChartRange::Month),
            "year" | "yearly" => Ok(ChartRange::Year),
            _ => Err(format!("unknown chart range: {}", s)),
        }
    }
}

/// A record that can be placed on a dual-series chart.
pub trait ChartEntry {
    /// When the record happened; `None` counts as now.
    fn occurred_at(&self) -> Option<DateTime<Utc>>;

    /// Contribution as `(income_like, expense_like)`, both non-negative.
    fn split(&self) -> (f64, f64);
}

impl ChartEntry for TransactionRecord {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.occurred_at
    }

    fn split(&self) -> (f64, f64) {
        match self.kind {
            TransactionKind::Income => (self.amount, 0.0),
            TransactionKind::Expense => (0.0, self.amount),
        }
    }
}

impl ChartEntry for ActivityRecord {
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.occurred_at
    }

    fn split(&self) -> (f64, f64) {
        if self.impact_kg < 0.0 {
            (self.impact_kg.abs(), 0.0)
        } else {
            (0.0, self.impact_kg)
        }
    }
}

/// One bar pair on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// Stable grouping key (`2026-10-18`, `Oct 26`, `2026`)
    pub key: String,
    /// Short axis label (`Sun`, `Oct 26`, `2026`)
    pub label: String,
    /// Income, or carbon offset magnitude
    pub income: f64,
    /// Expense, or carbon emission
    pub expense: f64,
}

impl Bucket {
    fn empty(key: String, label: String) -> Self {
        Self {
            key,
            label,
            income: 0.0,
            expense: 0.0,
        }
    }
}

/// Buckets for one range, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub range: ChartRange,
    pub buckets: Vec<Bucket>,
}

impl Chart {
    /// Bucket records into `range` relative to the clock's today.
    pub fn build<T: ChartEntry>(records: &[T], range: ChartRange, clock: &Clock) -> Self {
        let mut buckets = empty_buckets(records, range, clock);
        let index: HashMap<String, usize> = buckets
            .iter()
            .enumerate()
            .map(|(i, bucket)| (bucket.key.clone(), i))
            .collect();

        let mut skipped = 0usize;
        for record in records {
            let key = range.key(clock.local_day(record.occurred_at()));
            match index.get(&key) {
                Some(&i) => {
                    let (income, expense) = record.split();
                    buckets[i].income += income;
                    buckets[i].expense += expense;
                }
                None => skipped += 1,
            }
        }

        tracing::trace!(
            range = range.as_str(),
            buckets = buckets.len(),
            skipped,
            "Built chart"
        );

        Self { range, buckets }
    }

    /// Income-like series, parallel to [`Chart::labels`].
    pub fn incomes(&self) -> Vec<f64> {
        self.buckets.iter().map(|b| b.income).collect()
    }

    /// Expense-like series, parallel to [`Chart::labels`].
    pub fn expenses(&self) -> Vec<f64> {
        self.buckets.iter().map(|b| b.expense).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn total_income(&self) -> f64 {
        self.buckets.iter().map(|b| b.income).sum()
    }

    pub fn total_expense(&self) -> f64 {
        self.buckets.iter().map(|b| b.expense).sum()
    }

    /// Largest single bar, for scaling.
    pub fn max_value(&self) -> f64 {
        self.buckets
            .iter()
            .flat_map(|b| [b.income, b.expense])
            .fold(0.0, f64::max)
    }
}

fn empty_buckets<T: ChartEntry>(records: &[T], range: ChartRange, clock: &Clock) -> Vec<Bucket> {
    let today = clock.today();
    match range {
        ChartRange::Week => (0..WEEK_DAYS)
            .rev()
            .map(|offset| {
                let day = clock.days_ago(offset);
                Bucket::empty(range.key(day), day.format("%a").to_string())
            })
            .collect(),
        ChartRange::Month => {
            let first_of_month = today.with_day(1).unwrap_or(today);
            (0..YEAR_MONTHS)
                .rev()
                .filter_map(|offset| first_of_month.checked_sub_months(Months::new(offset)))
                .map(|month| {
                    let key = range.key(month);
                    Bucket::empty(key.clone(), key)
                })
                .collect()
        }
        ChartRange::Year => {
            let first_year = records
                .iter()
                .map(|r| clock.local_day(r.occurred_at()).year())
                .min()
                .unwrap_or(today.year())
                .min(today.year());
            (first_year..=today.year())
                .map(|year| Bucket::empty(year.to_string(), year.to_string()))
                .collect()
        }
    }
}

/// Daily total of a usage reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotal {
    pub key: String,
    pub label: String,
    pub total: f64,
}

/// Single-series chart of the last 7 days of usage, oldest first.
pub fn usage_week(logs: &[UsageLogRecord], clock: &Clock) -> Vec<DayTotal> {
    let mut by_day: HashMap<NaiveDate, f64> = HashMap::new();
    for log in logs {
        *by_day.entry(clock.local_day(log.occurred_at)).or_default() += log.quantity;
    }

    (0..WEEK_DAYS)
        .rev()
        .map(|offset| {
            let day = clock.days_ago(offset);
            DayTotal {
                key: ChartRange::Week.key(day),
                label: day.format("%a").to_string(),
                total: by_day.get(&day).copied().unwrap_or(0.0),
            }
        })
        .collect()
}
