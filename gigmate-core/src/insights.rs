//! Insight reducers for the dashboard: totals, best shift, week-over-week
//! delta and top platform this month.
//!
//! Ties always go to the first candidate in input order.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{ShiftFigures, effective_hourly_rate_cents};
use crate::shift::{Platform, RateSettings, ShiftRecord};
use crate::time::{TimeReference, add_months};

/// Which records the totals and best-shift insights look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightScope {
    Week,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub net_cents: i64,
    pub hours: f64,
    pub average_hourly_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestShift {
    pub shift_id: String,
    pub platform: Platform,
    pub started_at: DateTime<Utc>,
    /// Local calendar date the shift started on
    pub date: NaiveDate,
    pub net_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekOverWeek {
    pub current_net_cents: i64,
    pub previous_net_cents: i64,
    pub diff_cents: i64,
    /// Only present when the previous week netted more than zero
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformNet {
    pub platform: Platform,
    pub net_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    pub scope: InsightScope,
    pub totals: Totals,
    pub best_shift: Option<BestShift>,
    pub week_over_week: WeekOverWeek,
    pub top_platform_this_month: Option<PlatformNet>,
}

/// Sum net and hours; average hourly is zero-guarded.
pub fn totals_and_average(records: &[ShiftRecord], settings: &RateSettings) -> Totals {
    let (net_cents, hours) = records.iter().fold((0i64, 0.0f64), |(net, hours), shift| {
        let f = ShiftFigures::compute(shift, settings);
        (net.saturating_add(f.net_cents), hours + f.hours)
    });

    Totals {
        net_cents,
        hours,
        average_hourly_cents: effective_hourly_rate_cents(net_cents, hours),
    }
}

/// The shift with the highest net profit. Ties keep the earliest in input order.
pub fn best_single_shift(
    records: &[ShiftRecord],
    settings: &RateSettings,
    reference: &TimeReference,
) -> Option<BestShift> {
    let mut best: Option<(&ShiftRecord, i64)> = None;

    for shift in records {
        let net = ShiftFigures::compute(shift, settings).net_cents;
        if best.map(|(_, b)| net > b).unwrap_or(true) {
            best = Some((shift, net));
        }
    }

    best.map(|(shift, net_cents)| BestShift {
        shift_id: shift.id.clone(),
        platform: shift.platform,
        started_at: shift.started_at,
        date: reference.local_date_of(shift.started_at),
        net_cents,
    })
}

/// Shifts whose local start date falls in the current calendar week.
pub fn shifts_in_week<'a>(
    records: &'a [ShiftRecord],
    week_start: NaiveDate,
    reference: &TimeReference,
) -> Vec<&'a ShiftRecord> {
    let week_end = week_start + Duration::weeks(1);
    records
        .iter()
        .filter(|s| reference.in_dates(s.started_at, week_start, week_end))
        .collect()
}

/// Current calendar week's net against the week before.
///
/// The percentage is only computed when the previous week's net is positive;
/// otherwise just the absolute delta is reported.
pub fn week_over_week(
    records: &[ShiftRecord],
    settings: &RateSettings,
    reference: &TimeReference,
) -> WeekOverWeek {
    let this_week = reference.current_week_start();
    let last_week = this_week - Duration::weeks(1);

    let net_of = |week_start: NaiveDate| -> i64 {
        shifts_in_week(records, week_start, reference)
            .into_iter()
            .fold(0i64, |acc, s| {
                acc.saturating_add(ShiftFigures::compute(s, settings).net_cents)
            })
    };

    let current = net_of(this_week);
    let previous = net_of(last_week);
    let diff = current.saturating_sub(previous);

    WeekOverWeek {
        current_net_cents: current,
        previous_net_cents: previous,
        diff_cents: diff,
        percent: (previous > 0).then(|| diff as f64 / previous as f64 * 100.0),
    }
}

/// Platform with the highest net in the current calendar month.
pub fn top_platform_this_month(
    records: &[ShiftRecord],
    settings: &RateSettings,
    reference: &TimeReference,
) -> Option<PlatformNet> {
    let month_start = reference.current_month_start();
    let next_month = add_months(month_start, 1);

    // insertion-ordered so ties resolve to the first platform seen
    let mut by_platform: Vec<PlatformNet> = Vec::new();
    for shift in records
        .iter()
        .filter(|s| reference.in_dates(s.started_at, month_start, next_month))
    {
        let net = ShiftFigures::compute(shift, settings).net_cents;
        match by_platform.iter_mut().find(|p| p.platform == shift.platform) {
            Some(entry) => entry.net_cents = entry.net_cents.saturating_add(net),
            None => by_platform.push(PlatformNet {
                platform: shift.platform,
                net_cents: net,
            }),
        }
    }

    let mut top: Option<PlatformNet> = None;
    for candidate in by_platform {
        if top.map(|t| candidate.net_cents > t.net_cents).unwrap_or(true) {
            top = Some(candidate);
        }
    }
    top
}

/// All dashboard insights at once.
///
/// Returns `None` when there is nothing to say: no records, no rate
/// settings, or an empty current week under [`InsightScope::Week`].
pub fn compute_insights(
    records: &[ShiftRecord],
    settings: Option<&RateSettings>,
    scope: InsightScope,
    reference: &TimeReference,
) -> Option<InsightsReport> {
    let settings = settings?;
    if records.is_empty() {
        return None;
    }

    let scoped: Vec<ShiftRecord> = match scope {
        InsightScope::All => records.to_vec(),
        InsightScope::Week => shifts_in_week(records, reference.current_week_start(), reference)
            .into_iter()
            .cloned()
            .collect(),
    };
    if scoped.is_empty() {
        return None;
    }

    Some(InsightsReport {
        scope,
        totals: totals_and_average(&scoped, settings),
        best_shift: best_single_shift(&scoped, settings, reference),
        week_over_week: week_over_week(records, settings, reference),
        top_platform_this_month: top_platform_this_month(records, settings, reference),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> TimeReference {
        // Wednesday 2026-10-21
        TimeReference::new(
            Utc.with_ymd_and_hms(2026, 10, 21, 12, 0, 0).unwrap(),
            chrono_tz::UTC,
        )
    }

    fn at(m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, m, d, h, 0, 0).unwrap()
    }

    fn shift(
        id: &str,
        platform: Platform,
        start: DateTime<Utc>,
        hours: i64,
        gross: i64,
    ) -> ShiftRecord {
        ShiftRecord::new(id, platform, start, Some(start + Duration::hours(hours)))
            .with_gross(gross)
    }

    // zero rates make net == gross - fuel, which keeps expectations readable
    fn flat() -> RateSettings {
        RateSettings::ZERO
    }

    #[test]
    fn test_totals_and_average() {
        let records = vec![
            shift("a", Platform::Uber, at(10, 19, 9), 2, 3000),
            shift("b", Platform::Lyft, at(10, 20, 9), 3, 4500),
        ];
        let totals = totals_and_average(&records, &flat());
        assert_eq!(totals.net_cents, 7500);
        assert_eq!(totals.hours, 5.0);
        assert_eq!(totals.average_hourly_cents, 1500);
    }

    #[test]
    fn test_totals_zero_hours() {
        let records =
            vec![ShiftRecord::new("a", Platform::Uber, at(10, 19, 9), None).with_gross(3000)];
        let totals = totals_and_average(&records, &flat());
        assert_eq!(totals.hours, 0.0);
        assert_eq!(totals.average_hourly_cents, 0);
    }

    #[test]
    fn test_best_single_shift_first_wins_ties() {
        let records = vec![
            shift("first", Platform::Uber, at(10, 19, 9), 2, 5000),
            shift("second", Platform::Lyft, at(10, 20, 9), 2, 5000),
            shift("small", Platform::Lyft, at(10, 21, 9), 2, 100),
        ];
        let best = best_single_shift(&records, &flat(), &reference()).unwrap();
        assert_eq!(best.shift_id, "first");
        assert_eq!(best.date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    }

    #[test]
    fn test_best_single_shift_empty() {
        assert!(best_single_shift(&[], &flat(), &reference()).is_none());
    }

    #[test]
    fn test_week_over_week_percent() {
        let records = vec![
            shift("this", Platform::Uber, at(10, 20, 9), 2, 10_000),
            shift("last", Platform::Uber, at(10, 14, 9), 2, 8000),
            shift("older", Platform::Uber, at(10, 7, 9), 2, 99_999),
        ];
        let wow = week_over_week(&records, &flat(), &reference());
        assert_eq!(wow.current_net_cents, 10_000);
        assert_eq!(wow.previous_net_cents, 8000);
        assert_eq!(wow.diff_cents, 2000);
        assert_eq!(wow.percent, Some(25.0));
    }

    #[test]
    fn test_week_over_week_previous_zero_reports_absolute_only() {
        let records = vec![shift("this", Platform::Uber, at(10, 20, 9), 2, 4000)];
        let wow = week_over_week(&records, &flat(), &reference());
        assert_eq!(wow.previous_net_cents, 0);
        assert_eq!(wow.diff_cents, 4000);
        assert_eq!(wow.percent, None);
    }

    #[test]
    fn test_week_boundary_is_half_open() {
        // Monday 00:00 belongs to this week only
        let records = vec![shift("edge", Platform::Uber, at(10, 19, 0), 1, 1000)];
        let wow = week_over_week(&records, &flat(), &reference());
        assert_eq!(wow.current_net_cents, 1000);
        assert_eq!(wow.previous_net_cents, 0);
    }

    #[test]
    fn test_top_platform_this_month() {
        let records = vec![
            shift("a", Platform::Uber, at(10, 2, 9), 2, 5000),
            shift("b", Platform::DoorDash, at(10, 3, 9), 2, 8000),
            shift("c", Platform::Uber, at(9, 30, 9), 2, 90_000),
        ];
        let top = top_platform_this_month(&records, &flat(), &reference()).unwrap();
        assert_eq!(top.platform, Platform::DoorDash);
        assert_eq!(top.net_cents, 8000);
    }

    #[test]
    fn test_top_platform_tie_goes_to_first_seen() {
        let records = vec![
            shift("a", Platform::Lyft, at(10, 2, 9), 2, 3000),
            shift("b", Platform::Instacart, at(10, 3, 9), 2, 3000),
        ];
        let top = top_platform_this_month(&records, &flat(), &reference()).unwrap();
        assert_eq!(top.platform, Platform::Lyft);
    }

    #[test]
    fn test_compute_insights_requires_settings_and_records() {
        let r = reference();
        let records = vec![shift("a", Platform::Uber, at(10, 20, 9), 2, 3000)];
        assert!(compute_insights(&records, None, InsightScope::All, &r).is_none());
        assert!(compute_insights(&[], Some(&flat()), InsightScope::All, &r).is_none());

        let old = vec![shift("a", Platform::Uber, at(9, 1, 9), 2, 3000)];
        assert!(compute_insights(&old, Some(&flat()), InsightScope::Week, &r).is_none());
        assert!(compute_insights(&old, Some(&flat()), InsightScope::All, &r).is_some());
    }

    #[test]
    fn test_compute_insights_week_scope() {
        let r = reference();
        let records = vec![
            shift("this", Platform::Uber, at(10, 20, 9), 2, 3000),
            shift("last", Platform::Lyft, at(10, 13, 9), 2, 9000),
        ];
        let report = compute_insights(&records, Some(&flat()), InsightScope::Week, &r).unwrap();
        assert_eq!(report.totals.net_cents, 3000);
        assert_eq!(report.best_shift.unwrap().shift_id, "this");
        assert_eq!(report.week_over_week.previous_net_cents, 9000);
    }
}
