//! gigmate-ingest: storage row types and the parsers that turn entry dumps
//! (JSON rows, exported CSV) into normalized shifts.

pub mod parsers;
pub mod types;

pub use parsers::csv_rows::{DollarParser, parse_dollars_to_cents, parse_entries_csv};
pub use parsers::json_rows::{load_entry_rows, load_settings_rows, parse_entry_rows};
pub use types::{EntryRow, SettingsRow, UserShift, normalize_rows};
