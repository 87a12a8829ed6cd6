use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc, Weekday};
use gigmate_core::time::parse_timezone;
use gigmate_core::{BucketOptions, RateSettings, TimeReference};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_gigmate_home;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Absent until the user saves rates; several reports need them
    #[serde(default)]
    pub rates: Option<RateSettings>,
    #[serde(default)]
    pub calendar: CalendarSection,
    #[serde(default)]
    pub chart: ChartSection,
    #[serde(default)]
    pub digest: DigestSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarSection {
    pub timezone: String,
    /// "monday" or "sunday"
    pub week_starts_on: String,
}

impl Default for CalendarSection {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            week_starts_on: "monday".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSection {
    pub weeks: u32,
    pub months: u32,
}

impl Default for ChartSection {
    fn default() -> Self {
        let d = BucketOptions::default();
        Self {
            weeks: d.weeks,
            months: d.months,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigestSection {
    /// Sender address, e.g. `GigMate <digest@example.com>`
    pub from_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rates: Some(RateSettings::new(67, 1500)),
            calendar: CalendarSection::default(),
            chart: ChartSection::default(),
            digest: DigestSection::default(),
        }
    }
}

impl Config {
    pub fn week_start(&self) -> Result<Weekday> {
        match self.calendar.week_starts_on.trim().to_lowercase().as_str() {
            "monday" | "mon" => Ok(Weekday::Mon),
            "sunday" | "sun" => Ok(Weekday::Sun),
            other => bail!("calendar.week_starts_on must be monday or sunday, got {other:?}"),
        }
    }

    pub fn time_reference(&self, now: DateTime<Utc>) -> Result<TimeReference> {
        let tz = parse_timezone(&self.calendar.timezone).context("calendar.timezone")?;
        Ok(TimeReference::new(now, tz).with_week_start(self.week_start()?))
    }

    pub fn bucket_options(&self) -> BucketOptions {
        BucketOptions {
            weeks: self.chart.weeks.max(1),
            months: self.chart.months.max(1),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_gigmate_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_partial_config() {
        let cfg: Config = toml::from_str(
            r#"
            [calendar]
            timezone = "America/New_York"
            week_starts_on = "Sunday"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.rates, None);
        assert_eq!(cfg.chart, ChartSection::default());
        assert_eq!(cfg.week_start().unwrap(), Weekday::Sun);

        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let r = cfg.time_reference(now).unwrap();
        assert_eq!(r.tz, chrono_tz::America::New_York);
        assert_eq!(r.week_start, Weekday::Sun);
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        assert!(s.contains("[rates]"));
        assert!(s.contains("mileage_rate_cents = 67"));
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_bad_calendar_values() {
        let mut cfg = Config::default();
        cfg.calendar.week_starts_on = "friday".to_string();
        assert!(cfg.week_start().is_err());

        cfg.calendar.week_starts_on = "monday".to_string();
        cfg.calendar.timezone = "Mars/Olympus".to_string();
        assert!(cfg.time_reference(Utc::now()).is_err());
    }
}
