//! Plain-text rendering of core reports for the terminal.

use gigmate_core::{DashboardStats, InsightsReport, PatternReport, TimeBucket, format_usd};

pub fn summary(stats: &DashboardStats) -> String {
    let rows = [
        ("Gross", format_usd(stats.gross_cents)),
        ("Fuel", format_usd(stats.fuel_cents)),
        ("Estimated tax", format_usd(stats.tax_cents)),
        ("Estimated expenses", format_usd(stats.expenses_cents)),
        ("Net profit", format_usd(stats.net_cents)),
        ("Hours", format!("{:.2}", stats.hours)),
        ("Effective hourly", format!("{}/hr", format_usd(stats.hourly_cents))),
    ];
    rows.iter()
        .map(|(label, value)| format!("{:<20}{:>14}\n", label, value))
        .collect()
}

pub fn chart(buckets: &[TimeBucket]) -> String {
    if buckets.is_empty() {
        return "No shifts in this range.\n".to_string();
    }

    let max = buckets.iter().map(|b| b.net_cents.max(0)).max().unwrap_or(0);
    let mut out = String::new();
    for b in buckets {
        let bar_len = if max > 0 {
            (b.net_cents.max(0) as i128 * 30 / max as i128) as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<14}{:>12}  {:>6.2}h  {}\n",
            b.label,
            format_usd(b.net_cents),
            b.hours,
            "#".repeat(bar_len)
        ));
    }
    out
}

pub fn insights(report: &InsightsReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Net {} over {:.2}h, averaging {}/hr\n",
        format_usd(report.totals.net_cents),
        report.totals.hours,
        format_usd(report.totals.average_hourly_cents)
    ));

    if let Some(best) = &report.best_shift {
        out.push_str(&format!(
            "Best shift: {} on {} netting {}\n",
            best.platform,
            best.date.format("%a %b %-d"),
            format_usd(best.net_cents)
        ));
    }

    let wow = &report.week_over_week;
    let direction = if wow.diff_cents >= 0 { "up" } else { "down" };
    match wow.percent {
        Some(pct) => out.push_str(&format!(
            "This week is {} {} ({:+.1}%) vs last week\n",
            direction,
            format_usd(wow.diff_cents.saturating_abs()),
            pct
        )),
        None => out.push_str(&format!(
            "This week is {} {} vs last week\n",
            direction,
            format_usd(wow.diff_cents.saturating_abs())
        )),
    }

    if let Some(top) = &report.top_platform_this_month {
        out.push_str(&format!(
            "Top platform this month: {} with {} net\n",
            top.platform,
            format_usd(top.net_cents)
        ));
    }
    out
}

pub fn patterns(report: &PatternReport) -> String {
    let mut out = String::from("Last 30 days\n");
    if let Some(day) = &report.best_weekday {
        out.push_str(&format!(
            "Best day: {} at {}/hr\n",
            day.weekday,
            format_usd(day.hourly_cents)
        ));
    }
    if let Some(window) = &report.best_time_window {
        out.push_str(&format!(
            "Best time: {} at {}/hr\n",
            window.window.label(),
            format_usd(window.hourly_cents)
        ));
    }
    if let Some(p) = &report.best_weekend_platform {
        out.push_str(&format!(
            "Best weekend platform: {} at {}/hr over {:.1}h\n",
            p.platform,
            format_usd(p.hourly_cents),
            p.hours
        ));
    }
    out
}
