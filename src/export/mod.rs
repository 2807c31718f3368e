//! Manifest export
//!
//! The CSV manifest is written next to the archive when requested. The text
//! manifest embedded in the archive lives in `manifest::text`.

pub mod csv;

pub use csv::{write_csv_manifest, CSV_HEADERS};
