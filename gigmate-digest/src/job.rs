//! The weekly digest run: partition by user, summarize, send, report.

use futures_util::future::join_all;
use gigmate_core::{
    RateSettings, ShiftRecord, WeeklySummaryParams, build_weekly_summary, calculate_weekly_stats,
};
use gigmate_ingest::UserShift;
use serde::{Deserialize, Serialize};

use crate::directory::UserDirectory;
use crate::mailer::{Mailer, OutgoingEmail};
use crate::window::{DigestWindow, Period};

pub const NO_ENTRIES_MESSAGE: &str = "No entries in the last 14 days. Nothing to send.";
pub const PROCESSED_MESSAGE: &str = "Weekly summaries processed.";

const REASON_NO_CONTACT: &str = "No email or auth error.";
const REASON_PROVIDER: &str = "Email provider error.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDigestResult {
    pub user_id: String,
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub this_week_entry_count: usize,
    pub previous_week_entry_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestReport {
    pub message: String,
    pub total_users_with_entries: usize,
    pub sent_count: usize,
    pub results: Vec<UserDigestResult>,
}

#[derive(Debug, Default)]
struct UserPeriods {
    this_week: Vec<ShiftRecord>,
    previous_week: Vec<ShiftRecord>,
}

/// Group shifts by user and period, keeping users in first-seen order.
/// Shifts with no user or outside both periods are dropped.
fn partition(shifts: &[UserShift], window: &DigestWindow) -> Vec<(String, UserPeriods)> {
    let mut by_user: Vec<(String, UserPeriods)> = Vec::new();

    for us in shifts {
        let Some(user_id) = us.user_id.as_deref() else {
            continue;
        };
        let Some(period) = window.period_of(us.shift.started_at) else {
            continue;
        };

        let idx = match by_user.iter().position(|(id, _)| id == user_id) {
            Some(i) => i,
            None => {
                by_user.push((user_id.to_string(), UserPeriods::default()));
                by_user.len() - 1
            }
        };
        let periods = &mut by_user[idx].1;
        match period {
            Period::ThisWeek => periods.this_week.push(us.shift.clone()),
            Period::PreviousWeek => periods.previous_week.push(us.shift.clone()),
        }
    }

    by_user
}

async fn digest_user<D: UserDirectory, M: Mailer>(
    user_id: &str,
    periods: &UserPeriods,
    directory: &D,
    mailer: &M,
    window: &DigestWindow,
    from: &str,
) -> UserDigestResult {
    let outcome = |reason: Option<&str>| UserDigestResult {
        user_id: user_id.to_string(),
        skipped: reason.is_some(),
        reason: reason.map(str::to_string),
        this_week_entry_count: periods.this_week.len(),
        previous_week_entry_count: periods.previous_week.len(),
    };

    let rates: Option<RateSettings> = match directory.settings(user_id).await {
        Ok(partial) => partial.map(|p| p.or_digest_defaults()),
        Err(e) => {
            tracing::warn!(user = %user_id, error = %e, "settings lookup failed, using defaults");
            None
        }
    };

    let contact = match directory.contact(user_id).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(user = %user_id, error = %e, "no contact for weekly summary");
            return outcome(Some(REASON_NO_CONTACT));
        }
    };

    let tz = window.reference.tz;
    let this_week = calculate_weekly_stats(&periods.this_week, rates.as_ref(), tz);
    let previous_week = (!periods.previous_week.is_empty())
        .then(|| calculate_weekly_stats(&periods.previous_week, rates.as_ref(), tz));

    let message = build_weekly_summary(&WeeklySummaryParams {
        full_name: contact.full_name.as_deref(),
        week_label: &window.label,
        this_week: &this_week,
        previous_week: previous_week.as_ref(),
    });

    let email = OutgoingEmail {
        from: from.to_string(),
        to: contact.email,
        subject: message.subject,
        html: message.html,
        text: message.text,
    };

    match mailer.send(&email).await {
        Ok(()) => {
            tracing::info!(user = %user_id, "weekly summary sent");
            outcome(None)
        }
        Err(e) => {
            tracing::warn!(user = %user_id, error = %e, "sending weekly summary failed");
            outcome(Some(REASON_PROVIDER))
        }
    }
}

/// Run the digest over `shifts` (typically the last 14 days of entries).
///
/// Users are processed concurrently and independently. Previous-week stats
/// are only computed when that week has entries.
pub async fn run_weekly_digest<D: UserDirectory, M: Mailer>(
    shifts: &[UserShift],
    directory: &D,
    mailer: &M,
    window: &DigestWindow,
    from: &str,
) -> DigestReport {
    let by_user = partition(shifts, window);
    if by_user.is_empty() {
        tracing::info!("no entries in the digest window");
        return DigestReport {
            message: NO_ENTRIES_MESSAGE.to_string(),
            total_users_with_entries: 0,
            sent_count: 0,
            results: Vec::new(),
        };
    }

    tracing::info!(users = by_user.len(), week = %window.label, "running weekly digest");

    let results = join_all(
        by_user
            .iter()
            .map(|(user_id, periods)| {
                digest_user(user_id, periods, directory, mailer, window, from)
            }),
    )
    .await;

    let sent_count = results.iter().filter(|r| !r.skipped).count();
    DigestReport {
        message: PROCESSED_MESSAGE.to_string(),
        total_users_with_entries: by_user.len(),
        sent_count,
        results,
    }
}
