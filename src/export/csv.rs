//! CSV manifest export
//!
//! One row per manifest entry, in manifest order, with a header row.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{ArchiveError, ArchiveResult};
use crate::manifest::{Manifest, ManifestEntry};

/// Column names, in output order
pub const CSV_HEADERS: [&str; 9] = [
    "OriginalPath",
    "RelativePath",
    "FileName",
    "SizeBytes",
    "SizeKB",
    "SizeMB",
    "ContentHash",
    "LastModified",
    "ArchivedAt",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CsvRecord<'a> {
    original_path: String,
    relative_path: &'a str,
    file_name: &'a str,
    size_bytes: u64,
    #[serde(rename = "SizeKB")]
    size_kb: f64,
    #[serde(rename = "SizeMB")]
    size_mb: f64,
    content_hash: String,
    last_modified: String,
    archived_at: String,
}

impl<'a> From<&'a ManifestEntry> for CsvRecord<'a> {
    fn from(entry: &'a ManifestEntry) -> Self {
        Self {
            original_path: entry.original_path().display().to_string(),
            relative_path: entry.relative_path(),
            file_name: entry.file_name(),
            size_bytes: entry.size_bytes(),
            size_kb: entry.size_kb(),
            size_mb: entry.size_mb(),
            content_hash: entry.content_hash().to_string(),
            last_modified: entry.last_modified().format(TIMESTAMP_FORMAT).to_string(),
            archived_at: entry.archived_at().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Write the manifest as CSV to `writer`
pub fn export_manifest_csv<W: Write>(manifest: &Manifest, writer: W) -> ArchiveResult<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);

    if manifest.is_empty() {
        csv_writer.write_record(CSV_HEADERS)?;
    }
    for entry in manifest.entries() {
        csv_writer.serialize(CsvRecord::from(entry))?;
    }

    csv_writer
        .flush()
        .map_err(|e| ArchiveError::ManifestExport(e.to_string()))
}

/// Write the manifest as CSV to a new file at `path`
pub fn write_csv_manifest(manifest: &Manifest, path: &Path) -> ArchiveResult<()> {
    let file = File::create(path).map_err(|e| {
        ArchiveError::ManifestExport(format!("Failed to create {}: {}", path.display(), e))
    })?;
    export_manifest_csv(manifest, file)?;

    info!(path = %path.display(), rows = manifest.len(), "csv manifest written");
    Ok(())
}
