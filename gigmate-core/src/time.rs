//! Time utilities: the injected "now" and timezone-aware calendar helpers.
//!
//! Every window the engine computes (current week, current month, trailing
//! 30 days) is relative to a [`TimeReference`] passed in by the caller, never
//! the system clock.

use anyhow::Result;
use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;

/// A fixed instant plus the calendar it should be read in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeReference {
    pub now: DateTime<Utc>,
    pub tz: Tz,
    /// First day of the week for "current week" windows (default Monday)
    pub week_start: Weekday,
}

impl TimeReference {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            now,
            tz,
            week_start: Weekday::Mon,
        }
    }

    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    /// Today's date in the reference timezone
    pub fn today(&self) -> NaiveDate {
        self.local_date_of(self.now)
    }

    /// Calendar date of an instant in the reference timezone
    pub fn local_date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Local wall-clock view of an instant
    pub fn local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// First day of the week containing `date`
    pub fn week_start_of(&self, date: NaiveDate) -> NaiveDate {
        let offset = (7 + date.weekday().num_days_from_monday()
            - self.week_start.num_days_from_monday())
            % 7;
        date - Duration::days(offset as i64)
    }

    pub fn current_week_start(&self) -> NaiveDate {
        self.week_start_of(self.today())
    }

    pub fn current_month_start(&self) -> NaiveDate {
        month_start_of(self.today())
    }

    /// UTC instant of local midnight at the start of `date`.
    ///
    /// When midnight does not exist locally (DST gap) the earliest valid
    /// instant of that day is used.
    pub fn start_of_day_utc(&self, date: NaiveDate) -> DateTime<Utc> {
        let mut candidate = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        for _ in 0..4 {
            if let Some(dt) = self.tz.from_local_datetime(&candidate).earliest() {
                return dt.with_timezone(&Utc);
            }
            candidate += Duration::minutes(30);
        }
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
    }

    /// Is `instant` within the local-date range `[from, until)`?
    pub fn in_dates(&self, instant: DateTime<Utc>, from: NaiveDate, until: NaiveDate) -> bool {
        let date = self.local_date_of(instant);
        date >= from && date < until
    }
}

/// First day of the month containing `date`
pub fn month_start_of(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shift a month-start date by a signed number of months
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Parse a stored timestamp: RFC 3339 (`2026-10-19T14:00:00Z`), or a local
/// `YYYY-MM-DD HH:MM[:SS]` interpreted in `tz`, returning UTC.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let ndt = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| anyhow::anyhow!("invalid timestamp '{raw}': {e}"))?;

    let local_dt = tz
        .from_local_datetime(&ndt)
        .single()
        .ok_or_else(|| anyhow::anyhow!("ambiguous or invalid local time (DST?): {raw} {tz}"))?;

    Ok(local_dt.with_timezone(&Utc))
}

/// Helper: format a UTC time as RFC 3339 with millisecond precision and `Z`.
pub fn to_rfc3339_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
