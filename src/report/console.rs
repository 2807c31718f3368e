//! Console reporter used by the `bak-archive` binary

use std::path::Path;

use tracing::{info, warn};

use super::ReportSink;
use crate::archive::SkippedEntry;
use crate::deletion::{DeletionGate, DeletionReport};
use crate::display::{format_preview_table, format_size};
use crate::manifest::{Manifest, ManifestEntry};
use crate::pipeline::{DeletionStatus, RunSummary};

/// Print a progress line every this many files
const PROGRESS_INTERVAL: usize = 100;

/// Prints user-facing progress to stdout
pub struct ConsoleReporter {
    preview_rows: usize,
}

impl ConsoleReporter {
    pub fn new(preview_rows: usize) -> Self {
        Self { preview_rows }
    }
}

impl ReportSink for ConsoleReporter {
    fn scan_started(&mut self, root: &Path, extension: &str) {
        info!(root = %root.display(), extension, "scan started");
        println!("Scanning {} for *.{} files...", root.display(), extension);
    }

    fn files_discovered(&mut self, count: usize) {
        println!("Found {} file(s). Calculating hashes...", count);
    }

    fn file_scanned(&mut self, index: usize, total: usize, _entry: &ManifestEntry) {
        if index == total || index % PROGRESS_INTERVAL == 0 {
            println!("  [{}/{}] processed", index, total);
        }
    }

    fn hash_failed(&mut self, path: &Path, reason: &str) {
        println!("  WARNING: could not hash {}: {}", path.display(), reason);
    }

    fn name_collision(&mut self, path: &Path, relative_path: &str) {
        println!(
            "  WARNING: {} left out, its name {} is already taken",
            path.display(),
            relative_path
        );
    }

    fn no_files_found(&mut self, root: &Path, extension: &str) {
        warn!(root = %root.display(), extension, "no matching files");
        println!("No *.{} files found under {}.", extension, root.display());
        println!("Nothing to archive.");
    }

    fn manifest_ready(&mut self, manifest: &Manifest) {
        println!();
        println!("Manifest");
        println!("========");
        println!("Files:      {}", manifest.len());
        println!("Total size: {}", format_size(manifest.total_bytes()));
        if self.preview_rows > 0 {
            println!("{}", format_preview_table(manifest, self.preview_rows));
            if manifest.len() > self.preview_rows {
                println!("  ... and {} more", manifest.len() - self.preview_rows);
            }
        }
        println!();
    }

    fn batch_started(&mut self, batch: usize, total_batches: usize, files: usize) {
        println!(
            "Archiving batch {}/{} ({} file(s))...",
            batch, total_batches, files
        );
    }

    fn entry_skipped(&mut self, skipped: &SkippedEntry) {
        println!(
            "  WARNING: not archived {}: {}",
            skipped.original_path.display(),
            skipped.reason
        );
    }

    fn manifest_embedded(&mut self, entry_name: &str) {
        println!("Embedded manifest as {}", entry_name);
    }

    fn archive_written(&mut self, path: &Path, size_bytes: u64) {
        println!(
            "Archive created: {} ({})",
            path.display(),
            format_size(size_bytes)
        );
    }

    fn csv_written(&mut self, path: &Path) {
        println!("CSV manifest:    {}", path.display());
    }

    fn verification_passed(&mut self, checked: usize) {
        println!("Verified {} archive entries against the manifest.", checked);
    }

    fn deletion_warning(&mut self, count: usize, total_bytes: u64) {
        println!();
        println!("################################################################");
        println!("#  WARNING: PERMANENT DELETION REQUESTED                        #");
        println!("################################################################");
        println!();
        println!(
            "{} source file(s) ({}) will be removed from disk.",
            count,
            format_size(total_bytes)
        );
        println!("This cannot be undone. Deleted files do not go to a recycle bin.");
        println!("The archive will be the ONLY remaining copy of these files.");
        println!();
    }

    fn deletion_aborted(&mut self, gate: DeletionGate) {
        info!(?gate, "deletion aborted");
        println!("Deletion cancelled ({}). No files were deleted.", gate);
    }

    fn deletion_failed(&mut self, path: &Path, reason: &str) {
        println!("  WARNING: could not delete {}: {}", path.display(), reason);
    }

    fn deletion_finished(&mut self, report: &DeletionReport) {
        println!(
            "Deleted {} file(s), {} failed.",
            report.deleted_count,
            report.failed_count()
        );
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        println!();
        println!("Summary");
        println!("=======");
        println!("Root:          {}", summary.root_path.display());
        println!("Files:         {}", summary.file_count);
        println!("Total size:    {}", format_size(summary.total_bytes));
        println!("Hash failures: {}", summary.hash_failures);
        if !summary.name_collisions.is_empty() {
            println!("Name clashes:  {} (left out)", summary.name_collisions.len());
            for path in &summary.name_collisions {
                println!("  - {}", path.display());
            }
        }
        if !summary.not_archived.is_empty() {
            println!(
                "Not archived:  {} (unreadable, kept on disk)",
                summary.not_archived.len()
            );
            for skipped in &summary.not_archived {
                println!("  - {}: {}", skipped.original_path.display(), skipped.reason);
            }
        }

        match &summary.archive_path {
            Some(path) => {
                println!("Archive:       {}", path.display());
                println!("Batches:       {}", summary.batches);
            }
            None => println!("Archive:       (dry run, nothing written)"),
        }
        if let Some(csv) = &summary.csv_path {
            println!("CSV manifest:  {}", csv.display());
        }
        if summary.verified {
            println!("Verification:  passed");
        }

        match &summary.deletion {
            DeletionStatus::NotRequested => {}
            DeletionStatus::Skipped => println!("Deletion:      skipped (dry run)"),
            DeletionStatus::Aborted(gate) => {
                println!("Deletion:      cancelled at {}", gate)
            }
            DeletionStatus::Completed(report) => {
                println!(
                    "Deletion:      {} deleted, {} failed",
                    report.deleted_count,
                    report.failed_count()
                );
                for failure in &report.failed {
                    println!("  - {}: {}", failure.path.display(), failure.reason);
                }
            }
        }
    }
}
