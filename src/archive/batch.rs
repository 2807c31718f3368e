//! Batched archive writing

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::{ArchiveError, ArchiveResult};
use crate::manifest::{render_text_manifest, Manifest, ManifestEntry, ManifestHeader};
use crate::report::ReportSink;

/// Name of the embedded text manifest
pub const MANIFEST_ENTRY_NAME: &str = "MANIFEST.txt";

/// A manifest entry that is not in the archive
///
/// Only entries whose hash already failed may be skipped; a read failure on a
/// file that hashed fine is a fatal write error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub original_path: PathBuf,
    pub relative_path: String,
    pub reason: String,
}

/// Append-only archive target
///
/// Implementations must keep earlier batches intact: each call adds entries
/// to what is already there.
pub trait ArchiveSink {
    /// Append every file in `batch`, named by its relative path
    ///
    /// Returns the entries that could not be read and were left out.
    fn append_batch(&mut self, batch: &[ManifestEntry]) -> ArchiveResult<Vec<SkippedEntry>>;

    /// Append the file at `source` as `entry_name`
    fn append_manifest(&mut self, entry_name: &str, source: &Path) -> ArchiveResult<()>;
}

/// What the archiver wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Number of `append_batch` calls issued
    pub batches: usize,
    /// Name the text manifest was stored under
    pub manifest_entry: String,
    /// Entries left out of the archive, in manifest order
    pub skipped: Vec<SkippedEntry>,
}

impl ArchiveReport {
    /// Whether the archive holds a copy of the file at `relative_path`
    pub fn is_archived(&self, relative_path: &str) -> bool {
        !self.skipped.iter().any(|s| s.relative_path == relative_path)
    }
}

/// Writes the manifest's files in contiguous batches
#[derive(Debug, Clone, Copy)]
pub struct BatchArchiver {
    batch_size: usize,
}

impl BatchArchiver {
    /// A batch size of zero is treated as one
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches needed for `files` entries
    pub fn batch_count(&self, files: usize) -> usize {
        files.div_ceil(self.batch_size)
    }

    /// Append all batches, then the text manifest
    ///
    /// Stops at the first failed batch; later batches are not attempted.
    pub fn write(
        &self,
        manifest: &Manifest,
        header: &ManifestHeader,
        sink: &mut dyn ArchiveSink,
        reporter: &mut dyn ReportSink,
    ) -> ArchiveResult<ArchiveReport> {
        let total_batches = self.batch_count(manifest.len());
        info!(
            files = manifest.len(),
            batch_size = self.batch_size,
            total_batches,
            "writing archive"
        );

        let mut skipped = Vec::new();
        for (index, batch) in manifest.batches(self.batch_size).enumerate() {
            reporter.batch_started(index + 1, total_batches, batch.len());
            let left_out = sink.append_batch(batch)?;
            debug!(
                batch = index + 1,
                files = batch.len(),
                skipped = left_out.len(),
                "batch appended"
            );
            for entry in &left_out {
                reporter.entry_skipped(entry);
            }
            skipped.extend(left_out);
        }

        let entry_name = manifest_entry_name(manifest, header.archive_date);
        let mut text = render_text_manifest(header, manifest);
        append_skipped_section(&mut text, &skipped);
        embed_text_manifest(sink, &entry_name, &text)?;
        reporter.manifest_embedded(&entry_name);

        Ok(ArchiveReport {
            batches: total_batches,
            manifest_entry: entry_name,
            skipped,
        })
    }
}

/// `MANIFEST.txt`, or a timestamped variant if a scanned file already has that name
pub fn manifest_entry_name(manifest: &Manifest, archive_date: DateTime<Local>) -> String {
    if manifest.contains_relative_path(MANIFEST_ENTRY_NAME) {
        format!("MANIFEST_{}.txt", archive_date.format("%Y%m%d_%H%M%S"))
    } else {
        MANIFEST_ENTRY_NAME.to_string()
    }
}

/// List entries that are in the manifest but not in the archive
fn append_skipped_section(text: &mut String, skipped: &[SkippedEntry]) {
    if skipped.is_empty() {
        return;
    }

    let _ = writeln!(text);
    let _ = writeln!(text, "NOT ARCHIVED ({} file(s), unreadable):", skipped.len());
    for entry in skipped {
        let _ = writeln!(text, "    {}: {}", entry.relative_path, entry.reason);
    }
}

/// Stage the text in a temporary file and append it
///
/// The temporary file is removed when it goes out of scope, whether or not
/// the append succeeded.
fn embed_text_manifest(
    sink: &mut dyn ArchiveSink,
    entry_name: &str,
    text: &str,
) -> ArchiveResult<()> {
    let mut staged = tempfile::Builder::new()
        .prefix("bak-archive-manifest")
        .suffix(".txt")
        .tempfile()
        .map_err(|e| ArchiveError::ArchiveWrite(format!("Failed to stage manifest: {}", e)))?;

    staged
        .write_all(text.as_bytes())
        .and_then(|_| staged.flush())
        .map_err(|e| ArchiveError::ArchiveWrite(format!("Failed to stage manifest: {}", e)))?;

    sink.append_manifest(entry_name, staged.path())
}
