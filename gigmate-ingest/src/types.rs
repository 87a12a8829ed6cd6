use anyhow::{Context, Result};
use chrono_tz::Tz;
use gigmate_core::time::parse_timestamp;
use gigmate_core::{PartialRateSettings, Platform, ShiftRecord};
use serde::{Deserialize, Serialize};

/// An `entries` row as storage hands it over: every column may be null and
/// timestamps are still strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryRow {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    /// Numeric columns arrive as JSON numbers that may carry a fraction
    #[serde(default)]
    pub gross_cents: Option<f64>,
    #[serde(default)]
    pub tips_cents: Option<f64>,
    #[serde(default)]
    pub fuel_cost_cents: Option<f64>,
    #[serde(default)]
    pub miles: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A normalized shift together with the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserShift {
    pub user_id: Option<String>,
    pub shift: ShiftRecord,
}

/// A `settings` row; each rate column may be null
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRow {
    pub user_id: String,
    #[serde(default)]
    pub mileage_rate_cents: Option<i64>,
    #[serde(default)]
    pub tax_rate_bps: Option<i64>,
}

impl SettingsRow {
    pub fn rates(&self) -> PartialRateSettings {
        PartialRateSettings {
            mileage_rate_cents: self.mileage_rate_cents,
            tax_rate_bps: self.tax_rate_bps,
        }
    }
}

/// Largest amount a single column may carry: ten trillion dollars
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000_000;

/// Null, NaN and negative amounts all read as 0; fractions round half away from zero.
/// Amounts above [`MAX_AMOUNT_CENTS`] are clamped to it.
fn cents_or_zero(raw: Option<f64>) -> i64 {
    match raw {
        Some(v) if v.is_finite() && v > 0.0 => v.round().min(MAX_AMOUNT_CENTS as f64) as i64,
        _ => 0,
    }
}

fn miles_or_zero(raw: Option<f64>) -> f64 {
    match raw {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

impl EntryRow {
    /// Normalize into a [`ShiftRecord`].
    ///
    /// Fails only when the start timestamp is missing or unparseable. A bad
    /// end timestamp becomes `None` so the shift still counts for money.
    pub fn to_shift(&self, tz: Tz) -> Result<UserShift> {
        let raw_start = self
            .started_at
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .with_context(|| format!("entry {} has no started_at", self.id))?;
        let started_at = parse_timestamp(raw_start, tz)
            .with_context(|| format!("entry {} started_at", self.id))?;

        let ended_at = match self.ended_at.as_deref().filter(|s| !s.trim().is_empty()) {
            None => None,
            Some(raw) => match parse_timestamp(raw, tz) {
                Ok(dt) => Some(dt),
                Err(e) => {
                    tracing::warn!(entry = %self.id, error = %e, "ignoring unparseable ended_at");
                    None
                }
            },
        };

        let shift = ShiftRecord {
            id: self.id.clone(),
            platform: self
                .platform
                .as_deref()
                .map(Platform::from_label)
                .unwrap_or(Platform::Other),
            started_at,
            ended_at,
            gross_cents: cents_or_zero(self.gross_cents),
            tips_cents: cents_or_zero(self.tips_cents),
            fuel_cost_cents: cents_or_zero(self.fuel_cost_cents),
            miles: miles_or_zero(self.miles),
            notes: self.notes.clone().filter(|n| !n.is_empty()),
        };

        Ok(UserShift {
            user_id: self.user_id.clone().filter(|u| !u.is_empty()),
            shift,
        })
    }
}

/// Normalize a batch of rows, skipping (and logging) rows that cannot be placed in time.
pub fn normalize_rows(rows: &[EntryRow], tz: Tz) -> Vec<UserShift> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        match row.to_shift(tz) {
            Ok(shift) => out.push(shift),
            Err(e) => tracing::warn!(entry = %row.id, error = %format!("{e:#}"), "skipping entry"),
        }
    }
    out
}

impl From<&ShiftRecord> for EntryRow {
    fn from(shift: &ShiftRecord) -> Self {
        Self {
            id: shift.id.clone(),
            user_id: None,
            platform: Some(shift.platform.label().to_string()),
            started_at: Some(gigmate_core::time::to_rfc3339_millis(shift.started_at)),
            ended_at: shift.ended_at.map(gigmate_core::time::to_rfc3339_millis),
            gross_cents: Some(shift.gross_cents as f64),
            tips_cents: Some(shift.tips_cents as f64),
            fuel_cost_cents: Some(shift.fuel_cost_cents as f64),
            miles: Some(shift.miles),
            notes: shift.notes.clone(),
        }
    }
}
