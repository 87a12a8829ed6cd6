//! Bucketing engine: rolls shifts into day/week/month windows of net profit
//! and hours for charting.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::ShiftFigures;
use crate::shift::{RateSettings, ShiftRecord};
use crate::time::{TimeReference, add_months, month_start_of};

/// Chart granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Day,
    Week,
    Month,
}

/// How far back week and month charts reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketOptions {
    pub weeks: u32,
    pub months: u32,
}

impl Default for BucketOptions {
    fn default() -> Self {
        Self { weeks: 8, months: 12 }
    }
}

/// Aggregated net/hours for one time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// Local calendar date the window starts on
    pub period_start: NaiveDate,
    pub label: String,
    pub net_cents: i64,
    pub hours: f64,
}

impl TimeBucket {
    fn empty(period_start: NaiveDate, label: String) -> Self {
        Self {
            period_start,
            label,
            net_cents: 0,
            hours: 0.0,
        }
    }

    fn add(&mut self, figures: &ShiftFigures) {
        self.net_cents = self.net_cents.saturating_add(figures.net_cents);
        self.hours += figures.hours;
    }
}

/// Bucket shifts for a chart.
///
/// Day mode always yields the 7 days of the current week, empty or not.
/// Week and month modes only yield windows that received at least one shift.
/// Shifts outside the chart's window are dropped. Without settings the
/// mileage and tax rates are treated as zero.
pub fn bucket_shifts(
    records: &[ShiftRecord],
    settings: Option<&RateSettings>,
    mode: ChartMode,
    reference: &TimeReference,
    options: BucketOptions,
) -> Vec<TimeBucket> {
    let settings = settings.copied().unwrap_or(RateSettings::ZERO);

    match mode {
        ChartMode::Day => bucket_days(records, &settings, reference),
        ChartMode::Week => {
            let current = reference.current_week_start();
            let weeks = options.weeks.max(1) as i64;
            let from = current - Duration::weeks(weeks - 1);
            let until = current + Duration::weeks(1);
            bucket_lazily(records, &settings, reference, from, until, |date| {
                let start = reference.week_start_of(date);
                (start, week_label(start))
            })
        }
        ChartMode::Month => {
            let current = reference.current_month_start();
            let months = options.months.max(1) as i32;
            let from = add_months(current, -(months - 1));
            let until = add_months(current, 1);
            bucket_lazily(records, &settings, reference, from, until, |date| {
                let start = month_start_of(date);
                (start, start.format("%b %Y").to_string())
            })
        }
    }
}

fn bucket_days(
    records: &[ShiftRecord],
    settings: &RateSettings,
    reference: &TimeReference,
) -> Vec<TimeBucket> {
    let week_start = reference.current_week_start();
    let mut buckets: Vec<TimeBucket> = (0..7)
        .map(|i| {
            let day = week_start + Duration::days(i);
            TimeBucket::empty(day, day.format("%a %-d").to_string())
        })
        .collect();

    for shift in records {
        let date = reference.local_date_of(shift.started_at);
        let offset = (date - week_start).num_days();
        if !(0..7).contains(&offset) {
            continue;
        }
        buckets[offset as usize].add(&ShiftFigures::compute(shift, settings));
    }

    buckets
}

fn bucket_lazily<F>(
    records: &[ShiftRecord],
    settings: &RateSettings,
    reference: &TimeReference,
    from: NaiveDate,
    until: NaiveDate,
    key_of: F,
) -> Vec<TimeBucket>
where
    F: Fn(NaiveDate) -> (NaiveDate, String),
{
    let mut buckets: BTreeMap<NaiveDate, TimeBucket> = BTreeMap::new();

    for shift in records {
        let date = reference.local_date_of(shift.started_at);
        if date < from || date >= until {
            continue;
        }
        let (start, label) = key_of(date);
        buckets
            .entry(start)
            .or_insert_with(|| TimeBucket::empty(start, label))
            .add(&ShiftFigures::compute(shift, settings));
    }

    // BTreeMap iteration is already ascending by period start
    buckets.into_values().collect()
}

fn week_label(start: NaiveDate) -> String {
    let end = start + Duration::days(6);
    format!("{}–{}", start.format("%b %-d"), end.format("%b %-d"))
}
