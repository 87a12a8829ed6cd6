//! gigmate-core: the financial aggregation engine behind GigMate.
//!
//! Turns logged shifts plus a user's rates into net profit, effective hourly
//! and tax figures, then rolls them up into chart buckets, dashboard insights,
//! 30-day patterns and the weekly digest. Everything here is pure and
//! synchronous; "now" always arrives as a [`TimeReference`].

pub mod buckets;
pub mod dashboard;
pub mod insights;
pub mod money;
pub mod patterns;
pub mod shift;
pub mod time;
pub mod weekly;

pub use buckets::{BucketOptions, ChartMode, TimeBucket, bucket_shifts};
pub use dashboard::{DashboardStats, dashboard_stats, shifts_in_current_week};
pub use insights::{
    BestShift, InsightScope, InsightsReport, PlatformNet, Totals, WeekOverWeek, best_single_shift,
    compute_insights, top_platform_this_month, totals_and_average, week_over_week,
};
pub use money::{
    ShiftFigures, cents_to_dollars, dollars_to_cents, duration_hours, effective_hourly_rate_cents,
    format_usd, mileage_deduction_cents, net_profit_cents, tax_estimate_cents,
};
pub use patterns::{
    PatternReport, PlatformRate, TimeWindow, TimeWindowRate, WeekdayRate, best_time_window,
    best_weekday_by_hourly, best_weekend_platform, compute_patterns,
};
pub use shift::{PartialRateSettings, Platform, RateSettings, ShiftRecord};
pub use time::TimeReference;
pub use weekly::{
    WeeklyComparison, WeeklyStats, WeeklySummaryMessage, WeeklySummaryParams,
    build_weekly_summary, calculate_weekly_stats, compare_weeks,
};
