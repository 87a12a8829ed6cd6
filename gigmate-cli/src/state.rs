use anyhow::{Context, Result};
use chrono_tz::Tz;
use gigmate_ingest::{EntryRow, UserShift, load_entry_rows, normalize_rows};
use std::fs;
use std::path::PathBuf;

/// `$GIGMATE_HOME`, or `~/.gigmate`
pub fn gigmate_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("GIGMATE_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".gigmate"))
}

pub fn ensure_gigmate_home() -> Result<PathBuf> {
    let dir = gigmate_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn entries_path() -> Result<PathBuf> {
    Ok(gigmate_home()?.join("entries.json"))
}

pub fn users_path() -> Result<PathBuf> {
    Ok(gigmate_home()?.join("users.json"))
}

pub fn read_entry_rows() -> Result<Vec<EntryRow>> {
    load_entry_rows(entries_path()?)
}

/// All stored entries, normalized. Rows that cannot be placed in time are skipped.
pub fn load_shifts(tz: Tz) -> Result<Vec<UserShift>> {
    let rows = read_entry_rows()?;
    let shifts = normalize_rows(&rows, tz);
    tracing::debug!(rows = rows.len(), shifts = shifts.len(), "loaded entries");
    Ok(shifts)
}

pub fn write_entry_rows(rows: &[EntryRow]) -> Result<()> {
    ensure_gigmate_home()?;
    let p = entries_path()?;
    let json = serde_json::to_string_pretty(rows)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// Merge `incoming` into `existing` by id; incoming rows replace stored ones.
/// Returns (added, replaced).
pub fn merge_rows(existing: &mut Vec<EntryRow>, incoming: Vec<EntryRow>) -> (usize, usize) {
    let mut added = 0;
    let mut replaced = 0;
    for row in incoming {
        match existing.iter_mut().find(|r| r.id == row.id) {
            Some(slot) => {
                // keep ownership from the stored row when the import has none
                let user_id = row.user_id.clone().or_else(|| slot.user_id.clone());
                *slot = EntryRow { user_id, ..row };
                replaced += 1;
            }
            None => {
                existing.push(row);
                added += 1;
            }
        }
    }
    (added, replaced)
}
