//! Shift record types for logged work sessions and per-user rate settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single logged work session, normalized from storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShiftRecord {
    /// Unique identifier for this record
    pub id: String,
    /// Gig platform the shift was worked on
    pub platform: Platform,
    /// When the shift started (UTC instant)
    pub started_at: DateTime<Utc>,
    /// When the shift ended; `None` when absent or unparseable in storage
    pub ended_at: Option<DateTime<Utc>>,
    /// Pay before any deductions, in cents
    pub gross_cents: i64,
    pub tips_cents: i64,
    pub fuel_cost_cents: i64,
    /// Distance driven, never negative
    pub miles: f64,
    /// Free text, not used in calculations
    pub notes: Option<String>,
}

/// Gig platforms a shift can be logged against
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    Uber,
    Lyft,
    DoorDash,
    Instacart,
    AmazonFlex,
    Other,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::Uber,
        Platform::Lyft,
        Platform::DoorDash,
        Platform::Instacart,
        Platform::AmazonFlex,
        Platform::Other,
    ];

    /// Storage label for this platform
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Uber => "Uber",
            Platform::Lyft => "Lyft",
            Platform::DoorDash => "DoorDash",
            Platform::Instacart => "Instacart",
            Platform::AmazonFlex => "AmazonFlex",
            Platform::Other => "Other",
        }
    }

    /// Lenient parse of a stored or user-typed label. Unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "uber" => Platform::Uber,
            "lyft" => Platform::Lyft,
            "doordash" => Platform::DoorDash,
            "instacart" => Platform::Instacart,
            "amazonflex" => Platform::AmazonFlex,
            _ => Platform::Other,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-user coefficients for derived calculations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateSettings {
    /// Cents deducted per mile (67 = $0.67/mile)
    pub mileage_rate_cents: i64,
    /// Basis points applied to taxable income (1500 = 15.00%)
    pub tax_rate_bps: i64,
}

impl RateSettings {
    /// Coefficients used by the weekly digest when a user has configured nothing.
    pub const DIGEST_DEFAULT: RateSettings = RateSettings {
        mileage_rate_cents: 65,
        tax_rate_bps: 2500,
    };

    /// Zero coefficients, used by charting when settings are absent.
    pub const ZERO: RateSettings = RateSettings {
        mileage_rate_cents: 0,
        tax_rate_bps: 0,
    };

    pub fn new(mileage_rate_cents: i64, tax_rate_bps: i64) -> Self {
        Self {
            mileage_rate_cents,
            tax_rate_bps,
        }
    }
}

/// A settings row as stored, where each column may be null
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartialRateSettings {
    pub mileage_rate_cents: Option<i64>,
    pub tax_rate_bps: Option<i64>,
}

impl PartialRateSettings {
    /// Fill each missing column with the digest default independently.
    pub fn or_digest_defaults(&self) -> RateSettings {
        RateSettings {
            mileage_rate_cents: self
                .mileage_rate_cents
                .unwrap_or(RateSettings::DIGEST_DEFAULT.mileage_rate_cents),
            tax_rate_bps: self
                .tax_rate_bps
                .unwrap_or(RateSettings::DIGEST_DEFAULT.tax_rate_bps),
        }
    }
}

impl From<RateSettings> for PartialRateSettings {
    fn from(s: RateSettings) -> Self {
        Self {
            mileage_rate_cents: Some(s.mileage_rate_cents),
            tax_rate_bps: Some(s.tax_rate_bps),
        }
    }
}

impl ShiftRecord {
    /// Create a shift with zeroed money fields; use the `with_*` builders to fill it in.
    pub fn new(
        id: impl Into<String>,
        platform: Platform,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            platform,
            started_at,
            ended_at,
            gross_cents: 0,
            tips_cents: 0,
            fuel_cost_cents: 0,
            miles: 0.0,
            notes: None,
        }
    }

    pub fn with_gross(mut self, cents: i64) -> Self {
        self.gross_cents = cents;
        self
    }

    pub fn with_tips(mut self, cents: i64) -> Self {
        self.tips_cents = cents;
        self
    }

    pub fn with_fuel(mut self, cents: i64) -> Self {
        self.fuel_cost_cents = cents;
        self
    }

    pub fn with_miles(mut self, miles: f64) -> Self {
        self.miles = miles;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// End timestamp, or the start when the end is missing (zero-length shift)
    pub fn ended_or_started(&self) -> DateTime<Utc> {
        self.ended_at.unwrap_or(self.started_at)
    }
}
