//! JSON row dumps: an array of `entries` or `settings` rows, as returned by
//! the storage API.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::types::{EntryRow, SettingsRow};

/// Parse a JSON array of entry rows.
pub fn parse_entry_rows(json: &str) -> Result<Vec<EntryRow>> {
    serde_json::from_str(json).context("parse entry rows")
}

/// Read entry rows from a JSON file. A missing file is an empty ledger.
pub fn load_entry_rows(path: impl AsRef<Path>) -> Result<Vec<EntryRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_entry_rows(&s).with_context(|| format!("parsing {}", path.display()))
}

/// Read settings rows from a JSON file. A missing file means no one configured rates.
pub fn load_settings_rows(path: impl AsRef<Path>) -> Result<Vec<SettingsRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))
}
