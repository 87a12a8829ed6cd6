//! Pattern reducers over the trailing 30 days: which weekday, time of day and
//! weekend platform pay best per hour.

use chrono::{Datelike, Duration, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::money::ShiftFigures;
use crate::shift::{Platform, RateSettings, ShiftRecord};
use crate::time::TimeReference;

pub const PATTERN_WINDOW_DAYS: i64 = 30;

/// Fixed clock-hour windows used for time-of-day patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    /// 05:00–10:59
    Morning,
    /// 11:00–16:59
    Afternoon,
    /// 17:00–21:59
    Evening,
    /// 22:00–04:59, spanning midnight
    LateNight,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Morning,
        TimeWindow::Afternoon,
        TimeWindow::Evening,
        TimeWindow::LateNight,
    ];

    /// Window for a local clock hour (0–23).
    pub fn of_hour(hour: u32) -> Self {
        match hour {
            5..=10 => TimeWindow::Morning,
            11..=16 => TimeWindow::Afternoon,
            17..=21 => TimeWindow::Evening,
            _ => TimeWindow::LateNight,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Morning => "Morning (5–11 AM)",
            TimeWindow::Afternoon => "Afternoon (11 AM–5 PM)",
            TimeWindow::Evening => "Evening (5–10 PM)",
            TimeWindow::LateNight => "Late night (10 PM–5 AM)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekdayRate {
    pub weekday: Weekday,
    /// 0 = Sunday … 6 = Saturday
    pub index: u32,
    pub hourly_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindowRate {
    pub window: TimeWindow,
    pub hourly_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformRate {
    pub platform: Platform,
    pub hourly_cents: i64,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub best_weekday: Option<WeekdayRate>,
    pub best_time_window: Option<TimeWindowRate>,
    pub best_weekend_platform: Option<PlatformRate>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accum {
    net: i64,
    hours: f64,
}

impl Accum {
    fn add(&mut self, f: &ShiftFigures) {
        self.net = self.net.saturating_add(f.net_cents);
        self.hours += f.hours;
    }

    /// Net per hour as a float, only for groups that logged time
    fn ratio(&self) -> Option<f64> {
        (self.hours > 0.0).then(|| self.net as f64 / self.hours)
    }
}

/// Index of the highest ratio; earlier groups win ties.
fn best_ratio<'a, I>(groups: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a Accum>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, group) in groups.into_iter().enumerate() {
        let Some(ratio) = group.ratio() else { continue };
        if best.map(|(_, b)| ratio > b).unwrap_or(true) {
            best = Some((i, ratio));
        }
    }
    best
}

/// Shifts that started within `(now - 30 days, now]`.
pub fn recent_shifts<'a>(
    records: &'a [ShiftRecord],
    reference: &TimeReference,
) -> Vec<&'a ShiftRecord> {
    let cutoff = reference.now - Duration::days(PATTERN_WINDOW_DAYS);
    records
        .iter()
        .filter(|s| s.started_at > cutoff && s.started_at <= reference.now)
        .collect()
}

/// Weekday (by local start date) with the best net per hour.
pub fn best_weekday_by_hourly(
    records: &[ShiftRecord],
    settings: &RateSettings,
    reference: &TimeReference,
) -> Option<WeekdayRate> {
    let mut days = [Accum::default(); 7];
    for shift in recent_shifts(records, reference) {
        let dow = reference.local(shift.started_at).weekday().num_days_from_sunday();
        days[dow as usize].add(&ShiftFigures::compute(shift, settings));
    }

    best_ratio(days.iter()).map(|(i, ratio)| {
        let index = i as u32;
        WeekdayRate {
            weekday: weekday_from_sunday(index),
            index,
            hourly_cents: ratio.round() as i64,
        }
    })
}

/// Time-of-day window with the best net per hour.
pub fn best_time_window(
    records: &[ShiftRecord],
    settings: &RateSettings,
    reference: &TimeReference,
) -> Option<TimeWindowRate> {
    let mut windows = [Accum::default(); 4];
    for shift in recent_shifts(records, reference) {
        let window = TimeWindow::of_hour(reference.local(shift.started_at).hour());
        let slot = TimeWindow::ALL.iter().position(|w| *w == window).unwrap_or(3);
        windows[slot].add(&ShiftFigures::compute(shift, settings));
    }

    best_ratio(windows.iter()).map(|(i, ratio)| TimeWindowRate {
        window: TimeWindow::ALL[i],
        hourly_cents: ratio.round() as i64,
    })
}

/// Platform with the best net per hour on Saturdays and Sundays.
pub fn best_weekend_platform(
    records: &[ShiftRecord],
    settings: &RateSettings,
    reference: &TimeReference,
) -> Option<PlatformRate> {
    let mut groups: Vec<(Platform, Accum)> = Vec::new();
    for shift in recent_shifts(records, reference) {
        let weekday = reference.local(shift.started_at).weekday();
        if !matches!(weekday, Weekday::Sat | Weekday::Sun) {
            continue;
        }
        let figures = ShiftFigures::compute(shift, settings);
        match groups.iter_mut().find(|(p, _)| *p == shift.platform) {
            Some((_, acc)) => acc.add(&figures),
            None => {
                let mut acc = Accum::default();
                acc.add(&figures);
                groups.push((shift.platform, acc));
            }
        }
    }

    best_ratio(groups.iter().map(|(_, acc)| acc)).map(|(i, ratio)| PlatformRate {
        platform: groups[i].0,
        hourly_cents: ratio.round() as i64,
        hours: groups[i].1.hours,
    })
}

/// All pattern insights. `None` without settings or when nothing qualifies.
pub fn compute_patterns(
    records: &[ShiftRecord],
    settings: Option<&RateSettings>,
    reference: &TimeReference,
) -> Option<PatternReport> {
    let settings = settings?;
    let report = PatternReport {
        best_weekday: best_weekday_by_hourly(records, settings, reference),
        best_time_window: best_time_window(records, settings, reference),
        best_weekend_platform: best_weekend_platform(records, settings, reference),
    };

    if report.best_weekday.is_none()
        && report.best_time_window.is_none()
        && report.best_weekend_platform.is_none()
    {
        return None;
    }
    Some(report)
}

fn weekday_from_sunday(index: u32) -> Weekday {
    match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}
