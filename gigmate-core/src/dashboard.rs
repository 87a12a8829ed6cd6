//! Dashboard stat cards: gross, estimated expenses, net and effective hourly
//! across a set of shifts.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::money::{
    duration_hours, effective_hourly_rate_cents, mileage_deduction_cents, net_profit_cents,
    tax_estimate_cents,
};
use crate::shift::{RateSettings, ShiftRecord};
use crate::time::TimeReference;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub gross_cents: i64,
    pub fuel_cents: i64,
    pub tax_cents: i64,
    pub net_cents: i64,
    /// Fuel plus estimated tax
    pub expenses_cents: i64,
    pub hours: f64,
    pub hourly_cents: i64,
}

/// Totals for the stat cards.
///
/// Gross, fuel and miles are summed first and the per-shift tax rule is
/// applied once to the sums. Without settings everything is zero.
pub fn dashboard_stats(records: &[ShiftRecord], settings: Option<&RateSettings>) -> DashboardStats {
    let Some(settings) = settings else {
        return DashboardStats::default();
    };

    let gross = records.iter().fold(0i64, |acc, s| acc.saturating_add(s.gross_cents));
    let fuel = records.iter().fold(0i64, |acc, s| acc.saturating_add(s.fuel_cost_cents));
    let miles: f64 = records.iter().map(|s| s.miles).sum();
    let hours: f64 = records
        .iter()
        .map(|s| duration_hours(s.started_at, s.ended_or_started()))
        .sum();

    let mileage = mileage_deduction_cents(miles, settings.mileage_rate_cents);
    let tax = tax_estimate_cents(gross, mileage, fuel, settings.tax_rate_bps);
    let net = net_profit_cents(gross, fuel, tax);

    DashboardStats {
        gross_cents: gross,
        fuel_cents: fuel,
        tax_cents: tax,
        net_cents: net,
        expenses_cents: fuel.saturating_add(tax),
        hours,
        hourly_cents: effective_hourly_rate_cents(net, hours),
    }
}

/// Shifts overlapping the current week: started before the week ends and
/// ended on or after it began. Open shifts are treated as ending at their start.
pub fn shifts_in_current_week(
    records: &[ShiftRecord],
    reference: &TimeReference,
) -> Vec<ShiftRecord> {
    let week_start = reference.current_week_start();
    let from = reference.start_of_day_utc(week_start);
    let until = reference.start_of_day_utc(week_start + Duration::weeks(1));

    records
        .iter()
        .filter(|s| s.started_at < until && s.ended_or_started() >= from)
        .cloned()
        .collect()
}
