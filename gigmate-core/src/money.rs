//! Money/time primitives: the single-shift conversions every displayed figure
//! is derived from.
//!
//! All amounts are integer cents. Every rounding step rounds half away from
//! zero: `f64::round` for float products and [`div_round_half_away`] for
//! integer ratios. These functions are total over numeric input; sanitizing
//! nulls and NaN happens at the ingest boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shift::{RateSettings, ShiftRecord};

const MS_PER_HOUR: f64 = 3_600_000.0;
const BPS_DENOMINATOR: i128 = 10_000;

/// Integer division rounding half away from zero, saturating to `i64`.
///
/// Operands are `i128` so callers can form products of two `i64` cents
/// values without overflow. `den` must be positive.
pub fn div_round_half_away(num: i128, den: i128) -> i64 {
    debug_assert!(den > 0);
    let q = num / den;
    let r = num % den;
    let rounded = if 2 * r.abs() >= den { q + num.signum() } else { q };
    saturate_i64(rounded)
}

/// Clamp a wide intermediate back into cents.
pub fn saturate_i64(v: i128) -> i64 {
    v.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Elapsed hours between two instants, rounded to 2 decimals and never negative.
pub fn duration_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let ms = (end - start).num_milliseconds();
    let hours = ms as f64 / MS_PER_HOUR;
    ((hours * 100.0).round() / 100.0).max(0.0)
}

/// Mileage deduction in cents: `round(miles * rate)`.
///
/// Callers must pass non-negative miles; this does not sanitize.
pub fn mileage_deduction_cents(miles: f64, mileage_rate_cents: i64) -> i64 {
    // `as` saturates and maps NaN to 0
    (miles * mileage_rate_cents as f64).round() as i64
}

/// Per-shift tax estimate on `max(0, gross - mileage deduction - fuel)`.
pub fn tax_estimate_cents(
    gross_cents: i64,
    mileage_deduction_cents: i64,
    fuel_cost_cents: i64,
    tax_rate_bps: i64,
) -> i64 {
    let taxable = (gross_cents as i128 - mileage_deduction_cents as i128 - fuel_cost_cents as i128)
        .max(0);
    div_round_half_away(taxable * tax_rate_bps as i128, BPS_DENOMINATOR).max(0)
}

/// Net profit: gross minus fuel minus tax, exactly.
///
/// The mileage deduction is a tax shield only and is not subtracted here.
pub fn net_profit_cents(gross_cents: i64, fuel_cost_cents: i64, tax_estimate_cents: i64) -> i64 {
    saturate_i64(gross_cents as i128 - fuel_cost_cents as i128 - tax_estimate_cents as i128)
}

/// Net cents per hour, or 0 when `hours` is not a positive finite number.
pub fn effective_hourly_rate_cents(net_cents: i64, hours: f64) -> i64 {
    if !hours.is_finite() || hours <= 0.0 {
        return 0;
    }
    (net_cents as f64 / hours).round() as i64
}

/// Derived figures for one shift under a set of rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftFigures {
    pub mileage_deduction_cents: i64,
    pub tax_estimate_cents: i64,
    pub net_cents: i64,
    pub hours: f64,
}

impl ShiftFigures {
    pub fn compute(shift: &ShiftRecord, settings: &RateSettings) -> Self {
        let mileage = mileage_deduction_cents(shift.miles, settings.mileage_rate_cents);
        let tax = tax_estimate_cents(
            shift.gross_cents,
            mileage,
            shift.fuel_cost_cents,
            settings.tax_rate_bps,
        );
        Self {
            mileage_deduction_cents: mileage,
            tax_estimate_cents: tax,
            net_cents: net_profit_cents(shift.gross_cents, shift.fuel_cost_cents, tax),
            hours: duration_hours(shift.started_at, shift.ended_or_started()),
        }
    }

    /// Effective hourly rate for this shift alone
    pub fn hourly_cents(&self) -> i64 {
        effective_hourly_rate_cents(self.net_cents, self.hours)
    }
}

/// Dollar amount string with 2 decimals, e.g. `"12.34"`, `"-0.05"`.
pub fn cents_to_dollars(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Dollars to cents, rounding half away from zero. NaN and infinities become 0.
pub fn dollars_to_cents(dollars: f64) -> i64 {
    if !dollars.is_finite() {
        return 0;
    }
    (dollars * 100.0).round() as i64
}

/// US currency rendering: `$1,234.56`, `-$12.34`.
pub fn format_usd(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::Platform;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_div_round_half_away() {
        assert_eq!(div_round_half_away(5, 10), 1);
        assert_eq!(div_round_half_away(4, 10), 0);
        assert_eq!(div_round_half_away(-5, 10), -1);
        assert_eq!(div_round_half_away(-4, 10), 0);
        assert_eq!(div_round_half_away(15, 10), 2);
        assert_eq!(div_round_half_away(25, 10), 3);
        assert_eq!(div_round_half_away(0, 7), 0);
        assert_eq!(div_round_half_away(i128::MAX, 1), i64::MAX);
        assert_eq!(div_round_half_away(i128::MIN + 1, 1), i64::MIN);
    }

    #[test]
    fn test_huge_amounts_saturate_instead_of_overflowing() {
        // 1e16 cents * 1500 bps overflows i64 before the division
        assert_eq!(
            tax_estimate_cents(10_000_000_000_000_000, 0, 0, 1500),
            1_500_000_000_000_000
        );
        assert_eq!(tax_estimate_cents(i64::MAX, 0, 0, 10_000), i64::MAX);
        assert_eq!(net_profit_cents(i64::MIN, i64::MAX, 0), i64::MIN);

        let shift = ShiftRecord::new("big", Platform::Uber, t0(), Some(t0() + Duration::hours(1)))
            .with_gross(i64::MAX)
            .with_miles(1e300);
        let f = ShiftFigures::compute(&shift, &RateSettings::new(67, 1500));
        assert_eq!(f.mileage_deduction_cents, i64::MAX);
        assert_eq!(f.tax_estimate_cents, 0);
        assert_eq!(f.net_cents, i64::MAX);
    }

    #[test]
    fn test_duration_hours_rounds_to_two_decimals() {
        assert_eq!(duration_hours(t0(), t0() + Duration::minutes(90)), 1.5);
        // 20 minutes = 0.3333.. -> 0.33
        assert_eq!(duration_hours(t0(), t0() + Duration::minutes(20)), 0.33);
        // 40 minutes = 0.6666.. -> 0.67
        assert_eq!(duration_hours(t0(), t0() + Duration::minutes(40)), 0.67);
    }

    #[test]
    fn test_duration_hours_never_negative() {
        assert_eq!(duration_hours(t0(), t0()), 0.0);
        assert_eq!(duration_hours(t0(), t0() - Duration::hours(3)), 0.0);
        assert_eq!(duration_hours(t0(), t0() - Duration::seconds(1)), 0.0);
    }

    #[test]
    fn test_mileage_deduction() {
        assert_eq!(mileage_deduction_cents(20.0, 67), 1340);
        assert_eq!(mileage_deduction_cents(0.0, 67), 0);
        // 1.5 * 67 = 100.5 -> 101 (half away from zero)
        assert_eq!(mileage_deduction_cents(1.5, 67), 101);
        assert_eq!(mileage_deduction_cents(f64::NAN, 67), 0);
        for miles in [0.0, 0.1, 3.3, 12.75, 400.0] {
            for rate in [0, 1, 65, 67, 70] {
                assert!(mileage_deduction_cents(miles, rate) >= 0);
            }
        }
    }

    #[test]
    fn test_tax_estimate_floor_and_rounding() {
        assert_eq!(tax_estimate_cents(10_000, 1340, 1000, 1500), 1149);
        // deductions exceed gross -> taxable 0, no refund
        assert_eq!(tax_estimate_cents(1000, 2000, 500, 2500), 0);
        // 10 * 1500 / 10000 = 1.5 -> 2
        assert_eq!(tax_estimate_cents(10, 0, 0, 1500), 2);
    }

    #[test]
    fn test_tax_estimate_monotonic() {
        let rate = 1500;
        let mut last = 0;
        for gross in (0..20_000).step_by(137) {
            let tax = tax_estimate_cents(gross, 1340, 1000, rate);
            assert!(tax >= last);
            assert!(tax >= 0);
            last = tax;
        }

        let mut last = i64::MAX;
        for deduction in (0..12_000).step_by(113) {
            let tax = tax_estimate_cents(10_000, deduction, 500, rate);
            assert!(tax <= last);
            last = tax;
        }

        let mut last = i64::MAX;
        for fuel in (0..12_000).step_by(97) {
            let tax = tax_estimate_cents(10_000, 1340, fuel, rate);
            assert!(tax <= last);
            last = tax;
        }
    }

    #[test]
    fn test_net_profit_is_exact() {
        assert_eq!(net_profit_cents(10_000, 1000, 1149), 7851);
        assert_eq!(net_profit_cents(0, 500, 0), -500);
    }

    #[test]
    fn test_effective_hourly_zero_guard() {
        assert_eq!(effective_hourly_rate_cents(7851, 0.0), 0);
        assert_eq!(effective_hourly_rate_cents(-400, 0.0), 0);
        assert_eq!(effective_hourly_rate_cents(7851, f64::NAN), 0);
        assert_eq!(effective_hourly_rate_cents(7851, -1.0), 0);
        assert_eq!(effective_hourly_rate_cents(3000, 2.0), 1500);
        assert_eq!(effective_hourly_rate_cents(1000, 3.0), 333);
    }

    #[test]
    fn test_shift_figures_reference_scenario() {
        let shift = ShiftRecord::new("s1", Platform::Uber, t0(), Some(t0() + Duration::hours(4)))
            .with_gross(10_000)
            .with_fuel(1000)
            .with_miles(20.0);
        let figures = ShiftFigures::compute(&shift, &RateSettings::new(67, 1500));

        assert_eq!(figures.mileage_deduction_cents, 1340);
        assert_eq!(figures.tax_estimate_cents, 1149);
        assert_eq!(figures.net_cents, 7851);
        assert_eq!(figures.hours, 4.0);
        assert_eq!(figures.hourly_cents(), 1963);
    }

    #[test]
    fn test_shift_figures_zero_length() {
        let shift = ShiftRecord::new("s1", Platform::Lyft, t0(), Some(t0())).with_gross(5000);
        let figures = ShiftFigures::compute(&shift, &RateSettings::new(67, 1500));
        assert_eq!(figures.hours, 0.0);
        assert_eq!(figures.hourly_cents(), 0);
        assert_eq!(format_usd(figures.hourly_cents()), "$0.00");
    }

    #[test]
    fn test_currency_helpers() {
        assert_eq!(cents_to_dollars(1234), "12.34");
        assert_eq!(cents_to_dollars(5), "0.05");
        assert_eq!(cents_to_dollars(-5), "-0.05");
        assert_eq!(dollars_to_cents(12.5), 1250);
        assert_eq!(dollars_to_cents(0.125), 13);
        assert_eq!(dollars_to_cents(f64::NAN), 0);
        assert_eq!(format_usd(7851), "$78.51");
        assert_eq!(format_usd(123_456_789), "$1,234,567.89");
        assert_eq!(format_usd(100_000), "$1,000.00");
        assert_eq!(format_usd(-1234), "-$12.34");
        assert_eq!(format_usd(0), "$0.00");
    }
}
