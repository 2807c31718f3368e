//! Progress and summary reporting
//!
//! The pipeline never prints directly. It reports to a `ReportSink`, and the
//! binary plugs in `ConsoleReporter`. Every method has an empty default so a
//! sink only implements the events it cares about.

mod console;

use std::path::Path;

pub use console::ConsoleReporter;

use crate::archive::SkippedEntry;
use crate::deletion::{DeletionGate, DeletionReport};
use crate::manifest::{Manifest, ManifestEntry};
use crate::pipeline::RunSummary;

/// Receives pipeline events
pub trait ReportSink {
    /// Discovery is about to start
    fn scan_started(&mut self, _root: &Path, _extension: &str) {}

    /// Discovery finished with `count` matching files
    fn files_discovered(&mut self, _count: usize) {}

    /// Entry `index` of `total` (1-based) was added to the manifest
    fn file_scanned(&mut self, _index: usize, _total: usize, _entry: &ManifestEntry) {}

    /// A file could not be hashed; it stays in the manifest
    fn hash_failed(&mut self, _path: &Path, _reason: &str) {}

    /// A file was left out because its archive name was already taken
    fn name_collision(&mut self, _path: &Path, _relative_path: &str) {}

    /// Nothing matched; the run ends without writing anything
    fn no_files_found(&mut self, _root: &Path, _extension: &str) {}

    /// The manifest is complete
    fn manifest_ready(&mut self, _manifest: &Manifest) {}

    /// Batch `batch` of `total_batches` (1-based) is being appended
    fn batch_started(&mut self, _batch: usize, _total_batches: usize, _files: usize) {}

    /// A file whose hash failed could not be read either; it is not in the archive
    fn entry_skipped(&mut self, _skipped: &SkippedEntry) {}

    /// The text manifest was embedded under `entry_name`
    fn manifest_embedded(&mut self, _entry_name: &str) {}

    /// The archive is finished
    fn archive_written(&mut self, _path: &Path, _size_bytes: u64) {}

    /// The CSV manifest was written
    fn csv_written(&mut self, _path: &Path) {}

    /// The archive was re-read and all `checked` entries matched
    fn verification_passed(&mut self, _checked: usize) {}

    /// The irreversible-deletion warning for `count` files
    fn deletion_warning(&mut self, _count: usize, _total_bytes: u64) {}

    /// The deletion guard stopped at `gate`; nothing was deleted
    fn deletion_aborted(&mut self, _gate: DeletionGate) {}

    /// A source file could not be removed
    fn deletion_failed(&mut self, _path: &Path, _reason: &str) {}

    /// The deletion loop ran to completion
    fn deletion_finished(&mut self, _report: &DeletionReport) {}

    /// Final summary of the run
    fn run_finished(&mut self, _summary: &RunSummary) {}
}

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ReportSink for NullReporter {}
