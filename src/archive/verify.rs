//! Post-write verification
//!
//! Re-opens the finished archive and checks it against the manifest: every
//! archived entry must be present under its relative path and, where a digest
//! was recorded, hash to the same value. Entries the archiver left out are
//! not expected.

use std::fs::File;
use std::path::Path;

use tracing::{info, warn};
use zip::ZipArchive;

use super::batch::ArchiveReport;
use crate::error::{ArchiveError, ArchiveResult};
use crate::manifest::Manifest;
use crate::scan::Sha256Hasher;

/// Problems listed in the error message before the rest are elided
const MAX_REPORTED_PROBLEMS: usize = 5;

/// Verify `archive_path` against `manifest`; returns the number of entries checked
pub fn verify_archive(
    archive_path: &Path,
    manifest: &Manifest,
    report: &ArchiveReport,
) -> ArchiveResult<usize> {
    let manifest_entry = report.manifest_entry.as_str();
    let file = File::open(archive_path).map_err(|e| {
        ArchiveError::Verification(format!("Cannot open {}: {}", archive_path.display(), e))
    })?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| ArchiveError::Verification(format!("Unreadable archive: {}", e)))?;

    let mut problems = Vec::new();

    let expected_entries = manifest.len().saturating_sub(report.skipped.len()) + 1;
    if archive.len() != expected_entries {
        problems.push(format!(
            "expected {} entries, found {}",
            expected_entries,
            archive.len()
        ));
    }

    if archive.index_for_name(manifest_entry).is_none() {
        problems.push(format!("{}: missing", manifest_entry));
    }

    let mut checked = 0;
    for entry in manifest.entries() {
        if !report.is_archived(entry.relative_path()) {
            continue;
        }
        let zipped = match archive.by_name(entry.relative_path()) {
            Ok(zipped) => zipped,
            Err(_) => {
                problems.push(format!("{}: missing", entry.relative_path()));
                continue;
            }
        };

        if zipped.size() != entry.size_bytes() {
            problems.push(format!(
                "{}: size {} != recorded {}",
                entry.relative_path(),
                zipped.size(),
                entry.size_bytes()
            ));
        } else if let Some(expected) = entry.content_hash().digest() {
            match Sha256Hasher::hash_reader(zipped) {
                Ok(actual) if actual == expected => {}
                Ok(_) => problems.push(format!("{}: hash mismatch", entry.relative_path())),
                Err(e) => problems.push(format!("{}: {}", entry.relative_path(), e)),
            }
        }
        checked += 1;
    }

    if problems.is_empty() {
        info!(checked, path = %archive_path.display(), "archive verified");
        return Ok(checked);
    }

    for problem in &problems {
        warn!(problem = %problem, "verification problem");
    }

    let mut message = problems
        .iter()
        .take(MAX_REPORTED_PROBLEMS)
        .cloned()
        .collect::<Vec<_>>()
        .join("; ");
    if problems.len() > MAX_REPORTED_PROBLEMS {
        message.push_str(&format!(
            " (and {} more)",
            problems.len() - MAX_REPORTED_PROBLEMS
        ));
    }
    Err(ArchiveError::Verification(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{
        ArchiveSink, BatchArchiver, SkippedEntry, ZipArchiveSink, MANIFEST_ENTRY_NAME,
    };
    use crate::manifest::{ManifestBuilder, ManifestHeader};
    use crate::report::NullReporter;
    use chrono::Local;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn build(temp: &TempDir) -> (Manifest, PathBuf) {
        let root = temp.path().join("root");
        fs::create_dir_all(root.join("nested")).unwrap();
        let files = vec![root.join("one.bak"), root.join("nested").join("two.bak")];
        fs::write(&files[0], b"first file").unwrap();
        fs::write(&files[1], b"second file").unwrap();

        let hasher = Sha256Hasher;
        let manifest = ManifestBuilder::new(&root, &hasher).build(&files, &mut NullReporter);
        (manifest, root)
    }

    fn report_without_skips() -> ArchiveReport {
        ArchiveReport {
            batches: 1,
            manifest_entry: MANIFEST_ENTRY_NAME.to_string(),
            skipped: Vec::new(),
        }
    }

    fn write_archive(manifest: &Manifest, root: &Path, destination: &Path) -> ArchiveReport {
        let header = ManifestHeader {
            archive_date: Local::now(),
            root_path: root.to_path_buf(),
            archive_path: destination.to_path_buf(),
        };
        let mut sink = ZipArchiveSink::new(destination, 6);
        BatchArchiver::new(1)
            .write(manifest, &header, &mut sink, &mut NullReporter)
            .unwrap()
    }

    #[test]
    fn test_verify_good_archive() {
        let temp = TempDir::new().unwrap();
        let (manifest, root) = build(&temp);
        let destination = temp.path().join("out.zip");
        let report = write_archive(&manifest, &root, &destination);

        let checked = verify_archive(&destination, &manifest, &report).unwrap();
        assert_eq!(checked, 2);
    }

    #[test]
    fn test_verify_ignores_skipped_entries() {
        let temp = TempDir::new().unwrap();
        let (manifest, root) = build(&temp);
        let destination = temp.path().join("partial.zip");
        let staged = temp.path().join("staged.txt");
        fs::write(&staged, "manifest").unwrap();

        let mut sink = ZipArchiveSink::new(&destination, 6);
        sink.append_batch(&manifest.entries()[..1]).unwrap();
        sink.append_manifest(MANIFEST_ENTRY_NAME, &staged).unwrap();

        let report = ArchiveReport {
            skipped: vec![SkippedEntry {
                original_path: root.join("nested").join("two.bak"),
                relative_path: "nested/two.bak".to_string(),
                reason: "permission denied".to_string(),
            }],
            ..report_without_skips()
        };
        assert_eq!(verify_archive(&destination, &manifest, &report).unwrap(), 1);
        assert!(verify_archive(&destination, &manifest, &report_without_skips()).is_err());
    }

    #[test]
    fn test_verify_detects_missing_entries() {
        let temp = TempDir::new().unwrap();
        let (manifest, _root) = build(&temp);
        let destination = temp.path().join("partial.zip");

        // Only the first entry and no manifest
        let mut sink = ZipArchiveSink::new(&destination, 6);
        sink.append_batch(&manifest.entries()[..1]).unwrap();

        let err = verify_archive(&destination, &manifest, &report_without_skips()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("nested/two.bak: missing"));
        assert!(message.contains("MANIFEST.txt: missing"));
    }

    #[test]
    fn test_verify_detects_changed_content() {
        let temp = TempDir::new().unwrap();
        let (manifest, root) = build(&temp);

        // Same length, different bytes
        fs::write(root.join("one.bak"), b"FIRST FILE").unwrap();
        let destination = temp.path().join("out.zip");
        let report = write_archive(&manifest, &root, &destination);

        let err = verify_archive(&destination, &manifest, &report).unwrap_err();
        assert!(err.to_string().contains("one.bak: hash mismatch"));
    }

    #[test]
    fn test_verify_unreadable_archive() {
        let temp = TempDir::new().unwrap();
        let (manifest, _root) = build(&temp);
        let bogus = temp.path().join("bogus.zip");
        fs::write(&bogus, b"not a zip").unwrap();

        let err = verify_archive(&bogus, &manifest, &report_without_skips()).unwrap_err();
        assert!(matches!(err, ArchiveError::Verification(_)));
    }
}
