//! Weekly summary builder: period totals for the digest email, the
//! week-over-week comparison and the rendered message.
//!
//! The digest estimates tax once per period on total gross. This differs from
//! the per-shift estimate in [`crate::money::tax_estimate_cents`], which
//! deducts mileage and fuel first; both are kept as separate policies.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::money::{div_round_half_away, format_usd, mileage_deduction_cents, saturate_i64};
use crate::shift::{RateSettings, ShiftRecord};

/// Below this absolute percent change the weeks count as "about the same"
pub const SAME_WEEK_THRESHOLD_PCT: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub total_gross_cents: i64,
    pub total_tips_cents: i64,
    pub total_fuel_cents: i64,
    pub total_mileage_cents: i64,
    pub estimated_tax_cents: i64,
    pub net_cents: i64,
    pub total_minutes: i64,
    pub effective_hourly_cents: i64,
    pub best_day_label: Option<String>,
    pub best_day_net_cents: Option<i64>,
}

/// Period totals for one user's shifts.
///
/// Money totals include every shift. Minutes and the best-day pick only count
/// shifts that have an end timestamp. Missing settings fall back to
/// [`RateSettings::DIGEST_DEFAULT`].
pub fn calculate_weekly_stats(
    records: &[ShiftRecord],
    settings: Option<&RateSettings>,
    tz: Tz,
) -> WeeklyStats {
    let rates = settings.copied().unwrap_or(RateSettings::DIGEST_DEFAULT);

    let mut gross = 0i64;
    let mut tips = 0i64;
    let mut fuel = 0i64;
    let mut mileage = 0i64;
    let mut minutes = 0i64;
    // insertion order matters for ties
    let mut net_by_day: Vec<(String, i64)> = Vec::new();

    for shift in records {
        gross = gross.saturating_add(shift.gross_cents);
        tips = tips.saturating_add(shift.tips_cents);
        fuel = fuel.saturating_add(shift.fuel_cost_cents);

        let mileage_expense = mileage_deduction_cents(shift.miles, rates.mileage_rate_cents);
        mileage = mileage.saturating_add(mileage_expense);

        let Some(ended_at) = shift.ended_at else { continue };
        minutes = minutes.saturating_add((ended_at - shift.started_at).num_minutes().max(0));

        let day = weekday_name(shift.started_at.with_timezone(&tz));
        let net_before_tax = saturate_i64(
            shift.gross_cents as i128 + shift.tips_cents as i128
                - shift.fuel_cost_cents as i128
                - mileage_expense as i128,
        );
        match net_by_day.iter_mut().find(|(d, _)| *d == day) {
            Some((_, net)) => *net = net.saturating_add(net_before_tax),
            None => net_by_day.push((day, net_before_tax)),
        }
    }

    let estimated_tax =
        div_round_half_away(gross as i128 * rates.tax_rate_bps as i128, 10_000);
    let net = saturate_i64(
        gross as i128 + tips as i128 - fuel as i128 - mileage as i128 - estimated_tax as i128,
    );
    let effective_hourly = if minutes > 0 {
        div_round_half_away(net as i128 * 60, minutes as i128)
    } else {
        0
    };

    let mut best: Option<(String, i64)> = None;
    for (day, day_net) in net_by_day {
        if best.as_ref().map(|(_, b)| day_net > *b).unwrap_or(true) {
            best = Some((day, day_net));
        }
    }
    let (best_day_label, best_day_net_cents) = match best {
        Some((label, cents)) => (Some(label), Some(cents)),
        None => (None, None),
    };

    WeeklyStats {
        total_gross_cents: gross,
        total_tips_cents: tips,
        total_fuel_cents: fuel,
        total_mileage_cents: mileage,
        estimated_tax_cents: estimated_tax,
        net_cents: net,
        total_minutes: minutes,
        effective_hourly_cents: effective_hourly,
        best_day_label,
        best_day_net_cents,
    }
}

fn weekday_name(local: DateTime<Tz>) -> String {
    local.format("%A").to_string()
}

/// How this week's net compares with last week's
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum WeeklyComparison {
    /// No previous week, or a previous week with no gross
    NoHistory,
    AboutTheSame,
    /// Percent increase, positive
    More(f64),
    /// Percent decrease, positive magnitude
    Less(f64),
}

impl WeeklyComparison {
    pub fn sentence(&self) -> String {
        match self {
            WeeklyComparison::NoHistory => "No prior week data to compare yet.".to_string(),
            WeeklyComparison::AboutTheSame => {
                "You earned about the same net as last week.".to_string()
            }
            WeeklyComparison::More(pct) => {
                format!("You earned {:.1}% more net than last week. Nice work.", pct)
            }
            WeeklyComparison::Less(pct) => format!(
                "You earned {:.1}% less net than last week. That might just be normal variability.",
                pct
            ),
        }
    }
}

/// Classify the change from `previous` to `current`.
///
/// A previous week that netted exactly zero yields a 0% change rather than a
/// division by zero, which reads as "about the same".
pub fn compare_weeks(current: &WeeklyStats, previous: Option<&WeeklyStats>) -> WeeklyComparison {
    let Some(previous) = previous.filter(|p| p.total_gross_cents > 0) else {
        return WeeklyComparison::NoHistory;
    };

    let diff = current.net_cents as f64 - previous.net_cents as f64;
    let pct = if previous.net_cents != 0 {
        diff / previous.net_cents as f64 * 100.0
    } else {
        0.0
    };

    if pct.abs() < SAME_WEEK_THRESHOLD_PCT {
        WeeklyComparison::AboutTheSame
    } else if pct > 0.0 {
        WeeklyComparison::More(pct)
    } else {
        WeeklyComparison::Less(pct.abs())
    }
}

/// Inputs for rendering one user's weekly summary
#[derive(Debug, Clone)]
pub struct WeeklySummaryParams<'a> {
    /// Full display name; only the first word is used
    pub full_name: Option<&'a str>,
    pub week_label: &'a str,
    pub this_week: &'a WeeklyStats,
    pub previous_week: Option<&'a WeeklyStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummaryMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Greeting name: first word of the full name, or "there".
pub fn first_name_of(full_name: Option<&str>) -> String {
    full_name
        .and_then(|n| n.split_whitespace().next())
        .map(str::to_string)
        .unwrap_or_else(|| "there".to_string())
}

struct Figures {
    gross: String,
    fuel: String,
    mileage: String,
    tax: String,
    net: String,
    hours: String,
    hourly: String,
    best_day_line: String,
    comparison_line: String,
}

impl Figures {
    fn from_stats(this_week: &WeeklyStats, previous_week: Option<&WeeklyStats>) -> Self {
        let best_day_line = match (&this_week.best_day_label, this_week.best_day_net_cents) {
            (Some(label), Some(cents)) => {
                format!("Your best day was {} with {} net.", label, format_usd(cents))
            }
            _ => "No completed shifts this week.".to_string(),
        };

        Self {
            gross: format_usd(this_week.total_gross_cents),
            fuel: format_usd(this_week.total_fuel_cents),
            mileage: format_usd(this_week.total_mileage_cents),
            tax: format_usd(this_week.estimated_tax_cents),
            net: format_usd(this_week.net_cents),
            hours: format!("{:.1}", this_week.total_minutes as f64 / 60.0),
            hourly: format_usd(this_week.effective_hourly_cents),
            best_day_line,
            comparison_line: compare_weeks(this_week, previous_week).sentence(),
        }
    }
}

/// Render subject, HTML and plain-text bodies. Both bodies carry the same figures.
pub fn build_weekly_summary(params: &WeeklySummaryParams<'_>) -> WeeklySummaryMessage {
    let name = first_name_of(params.full_name);
    let f = Figures::from_stats(params.this_week, params.previous_week);

    let subject = format!("Your GigMate weekly summary ({})", params.week_label);

    let rows = [
        ("Total gross", format!("<strong>{}</strong>", f.gross)),
        ("Estimated fuel", f.fuel.clone()),
        ("Mileage expense", f.mileage.clone()),
        ("Estimated tax", f.tax.clone()),
        ("Net profit", format!("<strong>{}</strong>", f.net)),
        ("Hours worked", format!("{}h", f.hours)),
        ("Effective hourly", format!("<strong>{}/hr</strong>", f.hourly)),
    ];
    let table_rows: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                "        <tr>\n          <td style=\"padding: 4px 12px 4px 0; color: #6B7280;\">{}</td>\n          <td style=\"padding: 4px 0;\">{}</td>\n        </tr>\n",
                label, value
            )
        })
        .collect();

    let html = format!(
        concat!(
            "<div style=\"font-family: system-ui, -apple-system, 'Segoe UI', sans-serif; line-height: 1.5; color: #111827;\">\n",
            "  <h1 style=\"font-size: 20px; margin-bottom: 12px;\">Hi {name}, here’s your GigMate weekly summary.</h1>\n",
            "  <p style=\"margin-bottom: 16px; color: #4B5563;\">Period: <strong>{label}</strong></p>\n",
            "  <table style=\"border-collapse: collapse; margin-bottom: 16px;\">\n",
            "    <tbody>\n",
            "{rows}",
            "    </tbody>\n",
            "  </table>\n",
            "  <p style=\"margin-bottom: 8px;\">{best}</p>\n",
            "  <p style=\"margin-bottom: 16px;\">{cmp}</p>\n",
            "  <p style=\"margin-top: 24px; font-size: 12px; color: #9CA3AF;\">You’re receiving this because you have a GigMate account.</p>\n",
            "</div>\n",
        ),
        name = escape_html(&name),
        label = escape_html(params.week_label),
        rows = table_rows,
        best = f.best_day_line,
        cmp = f.comparison_line,
    );

    let text = format!(
        "Hi {name}, here’s your GigMate weekly summary.\n\
         Period: {label}\n\
         \n\
         Total gross: {gross}\n\
         Estimated fuel: {fuel}\n\
         Mileage expense: {mileage}\n\
         Estimated tax: {tax}\n\
         Net profit: {net}\n\
         Hours worked: {hours}h\n\
         Effective hourly: {hourly}/hr\n\
         \n\
         {best}\n\
         {cmp}\n\
         \n\
         You’re receiving this because you have a GigMate account.",
        name = name,
        label = params.week_label,
        gross = f.gross,
        fuel = f.fuel,
        mileage = f.mileage,
        tax = f.tax,
        net = f.net,
        hours = f.hours,
        hourly = f.hourly,
        best = f.best_day_line,
        cmp = f.comparison_line,
    );

    WeeklySummaryMessage { subject, html, text }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::Platform;
    use chrono::{Duration, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<chrono::Utc> {
        Utc.with_ymd_and_hms(2026, 10, d, h, 0, 0).unwrap()
    }

    fn stats_with(net: i64, gross: i64) -> WeeklyStats {
        WeeklyStats {
            total_gross_cents: gross,
            total_tips_cents: 0,
            total_fuel_cents: 0,
            total_mileage_cents: 0,
            estimated_tax_cents: 0,
            net_cents: net,
            total_minutes: 0,
            effective_hourly_cents: 0,
            best_day_label: None,
            best_day_net_cents: None,
        }
    }

    #[test]
    fn test_weekly_stats_period_tax_on_gross() {
        let records = vec![
            ShiftRecord::new(
                "a",
                Platform::Uber,
                at(19, 9),
                Some(at(19, 9) + Duration::minutes(150)),
            )
            .with_gross(10_000)
            .with_tips(500)
            .with_fuel(1000)
            .with_miles(20.0),
        ];
        let stats =
            calculate_weekly_stats(&records, Some(&RateSettings::new(67, 1500)), chrono_tz::UTC);

        assert_eq!(stats.total_mileage_cents, 1340);
        // period tax ignores deductions: 10000 * 15%
        assert_eq!(stats.estimated_tax_cents, 1500);
        assert_eq!(stats.net_cents, 10_000 + 500 - 1000 - 1340 - 1500);
        assert_eq!(stats.total_minutes, 150);
        // 6660 * 60 / 150 = 2664
        assert_eq!(stats.effective_hourly_cents, 2664);
        assert_eq!(stats.best_day_label.as_deref(), Some("Monday"));
        assert_eq!(stats.best_day_net_cents, Some(10_000 + 500 - 1000 - 1340));
    }

    #[test]
    fn test_weekly_stats_defaults_without_settings() {
        let records = vec![
            ShiftRecord::new("a", Platform::Lyft, at(19, 9), Some(at(19, 10)))
                .with_gross(4000)
                .with_miles(10.0),
        ];
        let stats = calculate_weekly_stats(&records, None, chrono_tz::UTC);
        assert_eq!(stats.total_mileage_cents, 650);
        assert_eq!(stats.estimated_tax_cents, 1000);
    }

    #[test]
    fn test_open_shift_counts_money_but_not_time() {
        let records = vec![
            ShiftRecord::new("open", Platform::Uber, at(20, 9), None).with_gross(3000),
        ];
        let stats = calculate_weekly_stats(&records, Some(&RateSettings::ZERO), chrono_tz::UTC);
        assert_eq!(stats.total_gross_cents, 3000);
        assert_eq!(stats.total_minutes, 0);
        assert_eq!(stats.effective_hourly_cents, 0);
        assert_eq!(stats.best_day_label, None);
        assert_eq!(stats.best_day_net_cents, None);
    }

    #[test]
    fn test_negative_span_adds_no_minutes() {
        let records = vec![
            ShiftRecord::new("bad", Platform::Uber, at(20, 9), Some(at(20, 7))).with_gross(3000),
        ];
        let stats = calculate_weekly_stats(&records, Some(&RateSettings::ZERO), chrono_tz::UTC);
        assert_eq!(stats.total_minutes, 0);
        assert_eq!(stats.best_day_label.as_deref(), Some("Tuesday"));
    }

    #[test]
    fn test_best_day_tie_keeps_first_day_seen() {
        let records = vec![
            ShiftRecord::new("w", Platform::Uber, at(21, 9), Some(at(21, 10))).with_gross(2000),
            ShiftRecord::new("m", Platform::Uber, at(19, 9), Some(at(19, 10))).with_gross(2000),
        ];
        let stats = calculate_weekly_stats(&records, Some(&RateSettings::ZERO), chrono_tz::UTC);
        assert_eq!(stats.best_day_label.as_deref(), Some("Wednesday"));
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let records = vec![
            ShiftRecord::new("a", Platform::Uber, at(19, 9), Some(at(19, 10)))
                .with_gross(10_000_000_000_000_000),
            ShiftRecord::new("b", Platform::Uber, at(20, 9), Some(at(20, 10)))
                .with_gross(10_000_000_000_000_000),
        ];
        let stats =
            calculate_weekly_stats(&records, Some(&RateSettings::new(0, 1500)), chrono_tz::UTC);
        assert_eq!(stats.total_gross_cents, 20_000_000_000_000_000);
        assert_eq!(stats.estimated_tax_cents, 3_000_000_000_000_000);
        assert_eq!(stats.net_cents, 17_000_000_000_000_000);
        assert_eq!(stats.effective_hourly_cents, 8_500_000_000_000_000);

        let maxed = vec![
            ShiftRecord::new("a", Platform::Uber, at(19, 9), Some(at(19, 10))).with_gross(i64::MAX),
            ShiftRecord::new("b", Platform::Uber, at(20, 9), Some(at(20, 10))).with_gross(i64::MAX),
        ];
        let stats = calculate_weekly_stats(&maxed, Some(&RateSettings::ZERO), chrono_tz::UTC);
        assert_eq!(stats.total_gross_cents, i64::MAX);
        assert_eq!(stats.net_cents, i64::MAX);
    }

    #[test]
    fn test_best_day_uses_local_weekday() {
        // 03:00 UTC Tuesday is Monday evening in Chicago
        let records = vec![
            ShiftRecord::new("late", Platform::Uber, at(20, 3), Some(at(20, 4))).with_gross(2000),
        ];
        let stats = calculate_weekly_stats(&records, None, chrono_tz::America::Chicago);
        assert_eq!(stats.best_day_label.as_deref(), Some("Monday"));
    }

    #[test]
    fn test_compare_weeks() {
        let current = stats_with(10_000, 12_000);
        assert_eq!(compare_weeks(&current, None), WeeklyComparison::NoHistory);
        assert_eq!(
            compare_weeks(&current, Some(&stats_with(5000, 0))),
            WeeklyComparison::NoHistory
        );
        assert_eq!(
            compare_weeks(&current, Some(&stats_with(8000, 9000))),
            WeeklyComparison::More(25.0)
        );
        assert_eq!(
            compare_weeks(&current, Some(&stats_with(9800, 9000))),
            WeeklyComparison::AboutTheSame
        );
        assert_eq!(
            compare_weeks(&stats_with(5000, 6000), Some(&stats_with(10_000, 12_000))),
            WeeklyComparison::Less(50.0)
        );
        // previous net of zero does not divide
        assert_eq!(
            compare_weeks(&current, Some(&stats_with(0, 2000))),
            WeeklyComparison::AboutTheSame
        );
    }

    #[test]
    fn test_comparison_sentences() {
        assert_eq!(
            WeeklyComparison::More(25.0).sentence(),
            "You earned 25.0% more net than last week. Nice work."
        );
        assert!(WeeklyComparison::Less(12.34).sentence().contains("12.3% less"));
    }

    #[test]
    fn test_first_name_of() {
        assert_eq!(first_name_of(Some("Ada Lovelace")), "Ada");
        assert_eq!(first_name_of(Some("   ")), "there");
        assert_eq!(first_name_of(None), "there");
    }

    #[test]
    fn test_summary_renderings_share_figures() {
        let mut this_week = stats_with(7851, 10_000);
        this_week.total_minutes = 90;
        this_week.effective_hourly_cents = 5234;
        this_week.best_day_label = Some("Friday".to_string());
        this_week.best_day_net_cents = Some(7851);
        let previous = stats_with(6500, 8000);

        let msg = build_weekly_summary(&WeeklySummaryParams {
            full_name: Some("Sam <Driver>"),
            week_label: "Oct 13 – Oct 19",
            this_week: &this_week,
            previous_week: Some(&previous),
        });

        assert_eq!(msg.subject, "Your GigMate weekly summary (Oct 13 – Oct 19)");
        for needle in ["$100.00", "$78.51", "1.5h", "$52.34/hr", "Friday", "20.8% more"] {
            assert!(msg.text.contains(needle), "text missing {needle}");
            assert!(msg.html.contains(needle), "html missing {needle}");
        }
        assert!(msg.text.starts_with("Hi Sam, "));
        assert!(msg.html.contains("Hi Sam, "));
    }
}
