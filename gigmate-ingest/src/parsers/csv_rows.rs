//! Re-import of GigMate's own CSV export.
//!
//! Expected header:
//!   id,platform,started_at,ended_at,hours,miles,gross_usd,tips_usd,fuel_cost_usd,notes
//!
//! `hours` is derived and ignored on the way back in. Money columns are
//! dollars and may carry `$` and thousands separators.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::Read;

use crate::types::EntryRow;

/// Compiled dollar-amount matcher, built once per import.
pub struct DollarParser {
    re: Regex,
}

impl DollarParser {
    pub fn new() -> Result<Self> {
        let re = Regex::new(r"^\s*(?P<neg>-)?\s*\$?\s*(?P<num>\d[\d,]*(?:\.\d*)?|\.\d+)\s*$")?;
        Ok(Self { re })
    }

    /// Dollar text to cents: `"$1,234.50"` -> 123450. Anything unparseable is 0.
    pub fn cents(&self, raw: &str) -> i64 {
        let Some(caps) = self.re.captures(raw) else {
            return 0;
        };
        let value: f64 = caps["num"].replace(',', "").parse().unwrap_or(0.0);
        let cents = gigmate_core::dollars_to_cents(value);
        if caps.name("neg").is_some() { -cents } else { cents }
    }
}

/// One-off conversion; use [`DollarParser`] when converting many cells.
pub fn parse_dollars_to_cents(raw: &str) -> Result<i64> {
    Ok(DollarParser::new()?.cents(raw))
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Parse exported CSV into entry rows. Rows without an id are skipped.
pub fn parse_entries_csv<R: Read>(reader: R) -> Result<Vec<EntryRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers().context("reading CSV header")?.clone();
    let idx_id = column(&headers, "id").context("CSV has no id column")?;
    let idx_platform = column(&headers, "platform");
    let idx_started = column(&headers, "started_at");
    let idx_ended = column(&headers, "ended_at");
    let idx_miles = column(&headers, "miles");
    let idx_gross = column(&headers, "gross_usd");
    let idx_tips = column(&headers, "tips_usd");
    let idx_fuel = column(&headers, "fuel_cost_usd");
    let idx_notes = column(&headers, "notes");

    let dollars_parser = DollarParser::new()?;
    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV record {}", line + 1))?;
        let get = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        // free text keeps its surrounding whitespace
        let raw = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let Some(id) = get(Some(idx_id)) else {
            tracing::warn!(line = line + 1, "skipping CSV row without id");
            continue;
        };

        let dollars = |idx: Option<usize>| get(idx).map(|s| dollars_parser.cents(&s) as f64);

        rows.push(EntryRow {
            id,
            user_id: None,
            platform: get(idx_platform),
            started_at: get(idx_started),
            ended_at: get(idx_ended),
            gross_cents: dollars(idx_gross),
            tips_cents: dollars(idx_tips),
            fuel_cost_cents: dollars(idx_fuel),
            miles: get(idx_miles).and_then(|s| s.parse::<f64>().ok()),
            notes: raw(idx_notes),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dollars() {
        let p = DollarParser::new().unwrap();
        assert_eq!(p.cents("12.34"), 1234);
        assert_eq!(p.cents("$1,234.50"), 123_450);
        assert_eq!(p.cents(" -$3 "), -300);
        assert_eq!(p.cents(".5"), 50);
        assert_eq!(p.cents("abc"), 0);
        assert_eq!(p.cents(""), 0);
        assert_eq!(parse_dollars_to_cents("7.85").unwrap(), 785);
    }

    #[test]
    fn test_parse_exported_csv() {
        let csv = "id,platform,started_at,ended_at,hours,miles,gross_usd,tips_usd,fuel_cost_usd,notes\r\n\
                   e1,Uber,2026-10-19T14:00:00.000Z,2026-10-19T16:00:00.000Z,2.00,20.00,100.00,5.50,10.00,\"late \"\"surge\"\", downtown\"\r\n\
                   e2,Lyft,2026-10-20T14:00:00.000Z,,0.00,0.00,40.00,0.00,0.00,\r\n\
                   ,Lyft,2026-10-20T14:00:00.000Z,,0.00,0.00,40.00,0.00,0.00,\r\n";

        let rows = parse_entries_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].gross_cents, Some(10_000.0));
        assert_eq!(rows[0].tips_cents, Some(550.0));
        assert_eq!(rows[0].miles, Some(20.0));
        assert_eq!(rows[0].notes.as_deref(), Some("late \"surge\", downtown"));
        assert_eq!(rows[1].ended_at, None);
        assert_eq!(rows[1].notes, None);
    }

    #[test]
    fn test_notes_keep_surrounding_spaces() {
        let csv = "id,platform,started_at,notes\n\
                   e1,Uber,2026-10-19T14:00:00Z,\"  airport run  \"\n\
                   e2,Uber,2026-10-19T15:00:00Z,\n";

        let rows = parse_entries_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].notes.as_deref(), Some("  airport run  "));
        assert_eq!(rows[0].platform.as_deref(), Some("Uber"));
        assert_eq!(rows[1].notes, None);
    }

    #[test]
    fn test_csv_without_id_column_errors() {
        let csv = "platform,started_at\nUber,2026-10-19T14:00:00Z\n";
        assert!(parse_entries_csv(csv.as_bytes()).is_err());
    }
}
