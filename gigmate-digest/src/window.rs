use chrono::{DateTime, Duration, NaiveDate, Utc};
use gigmate_core::TimeReference;

/// The two 7-day periods a digest covers, as inclusive local dates.
///
/// "This week" is the seven days ending today; "previous week" is the seven
/// days before that. Both are read in the reference timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestWindow {
    pub reference: TimeReference,
    pub this_week_start: NaiveDate,
    pub this_week_end: NaiveDate,
    pub previous_week_start: NaiveDate,
    pub previous_week_end: NaiveDate,
    /// e.g. `"Oct 13 – Oct 19"`
    pub label: String,
}

/// Which digest period an entry falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    ThisWeek,
    PreviousWeek,
}

impl DigestWindow {
    pub fn ending(reference: TimeReference) -> Self {
        let today = reference.today();
        let this_week_start = today - Duration::days(6);
        let previous_week_end = this_week_start - Duration::days(1);
        let previous_week_start = previous_week_end - Duration::days(6);

        let label = format!(
            "{} – {}",
            this_week_start.format("%b %-d"),
            today.format("%b %-d")
        );

        Self {
            reference,
            this_week_start,
            this_week_end: today,
            previous_week_start,
            previous_week_end,
            label,
        }
    }

    /// First instant covered by the window (start of the previous week)
    pub fn fetch_from(&self) -> DateTime<Utc> {
        self.reference.start_of_day_utc(self.previous_week_start)
    }

    pub fn period_of(&self, started_at: DateTime<Utc>) -> Option<Period> {
        let after = |d: NaiveDate| d + Duration::days(1);
        if self
            .reference
            .in_dates(started_at, self.this_week_start, after(self.this_week_end))
        {
            Some(Period::ThisWeek)
        } else if self.reference.in_dates(
            started_at,
            self.previous_week_start,
            after(self.previous_week_end),
        ) {
            Some(Period::PreviousWeek)
        } else {
            None
        }
    }
}
