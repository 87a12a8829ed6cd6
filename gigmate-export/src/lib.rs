//! gigmate-export: CSV export of logged shifts

pub mod entries_csv;

pub use entries_csv::{
    EXPORT_HEADER, entries_csv_string, export_filename, write_entries_csv, write_entries_file,
};
