//! Entries CSV: one row per shift, newest first.
//!
//! id,platform,started_at,ended_at,hours,miles,gross_usd,tips_usd,fuel_cost_usd,notes
//!
//! Rows end in CRLF. Notes are the only quoted column and only when present.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use gigmate_core::time::to_rfc3339_millis;
use gigmate_core::{ShiftRecord, cents_to_dollars, duration_hours};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const EXPORT_HEADER: [&str; 10] = [
    "id",
    "platform",
    "started_at",
    "ended_at",
    "hours",
    "miles",
    "gross_usd",
    "tips_usd",
    "fuel_cost_usd",
    "notes",
];

/// `gigmate-entries-2026-10-19.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("gigmate-entries-{}.csv", date.format("%Y-%m-%d"))
}

fn quote_notes(notes: Option<&str>) -> String {
    match notes {
        Some(n) if !n.is_empty() => format!("\"{}\"", n.replace('"', "\"\"")),
        _ => String::new(),
    }
}

fn row_of(shift: &ShiftRecord) -> [String; 10] {
    let hours = shift
        .ended_at
        .map(|end| duration_hours(shift.started_at, end))
        .unwrap_or(0.0);

    [
        shift.id.clone(),
        shift.platform.label().to_string(),
        to_rfc3339_millis(shift.started_at),
        shift.ended_at.map(to_rfc3339_millis).unwrap_or_default(),
        format!("{:.2}", hours),
        format!("{:.2}", shift.miles),
        cents_to_dollars(shift.gross_cents),
        cents_to_dollars(shift.tips_cents),
        cents_to_dollars(shift.fuel_cost_cents),
        quote_notes(shift.notes.as_deref()),
    ]
}

/// Write the header plus one row per record, newest start first.
pub fn write_entries_csv<W: Write>(writer: W, records: &[ShiftRecord]) -> Result<()> {
    // notes are quoted by hand, so the writer must never quote on its own
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    wtr.write_record(EXPORT_HEADER).context("writing CSV header")?;

    let mut sorted: Vec<&ShiftRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    for shift in sorted {
        wtr.write_record(row_of(shift))
            .with_context(|| format!("writing entry {}", shift.id))?;
    }

    wtr.flush().context("flushing CSV")?;
    Ok(())
}

pub fn entries_csv_string(records: &[ShiftRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_entries_csv(&mut buf, records)?;
    String::from_utf8(buf).context("CSV output is not UTF-8")
}

/// Export to a file, creating or truncating it.
pub fn write_entries_file(path: impl AsRef<Path>, records: &[ShiftRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_entries_csv(file, records)?;
    tracing::info!(path = %path.display(), rows = records.len(), "exported entries");
    Ok(())
}
