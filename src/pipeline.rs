//! Archive run orchestration
//!
//! Drives one invocation through its phases:
//!
//! 1. Scan the root and build the manifest
//! 2. Write the archive in batches, then embed the text manifest
//! 3. Optionally export the CSV manifest and verify the archive
//! 4. Optionally run the deletion guard
//!
//! All collaborators are passed in, so tests can substitute the hasher,
//! archive sink, prompt source and reporter.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::archive::{verify_archive, ArchiveSink, BatchArchiver, SkippedEntry, ZipArchiveSink};
use crate::config::ArchiveConfig;
use crate::deletion::{
    ConfirmationProvider, DeletionGate, DeletionGuard, DeletionOutcome, DeletionReport,
};
use crate::error::ArchiveResult;
use crate::export::write_csv_manifest;
use crate::manifest::{Manifest, ManifestBuilder, ManifestHeader};
use crate::report::ReportSink;
use crate::scan::{FileScanner, IntegrityHasher, ScanOptions, Sha256Hasher};

/// Validated configuration paired with the manifest it produced
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: ArchiveConfig,
    pub manifest: Manifest,
}

/// What happened to the source files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionStatus {
    /// Deletion was not asked for
    NotRequested,
    /// Deletion was asked for but the run was a dry run
    Skipped,
    /// The operator declined at a gate
    Aborted(DeletionGate),
    /// The deletion loop ran
    Completed(DeletionReport),
}

impl From<DeletionOutcome> for DeletionStatus {
    fn from(outcome: DeletionOutcome) -> Self {
        match outcome {
            DeletionOutcome::Aborted(gate) => Self::Aborted(gate),
            DeletionOutcome::Completed(report) => Self::Completed(report),
        }
    }
}

/// Totals reported at the end of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub root_path: PathBuf,
    pub file_count: usize,
    pub total_bytes: u64,
    pub hash_failures: usize,
    /// Discovered files left out of the manifest because of a name collision
    pub name_collisions: Vec<PathBuf>,
    /// Manifest entries that could not be read into the archive
    pub not_archived: Vec<SkippedEntry>,
    /// `None` on a dry run
    pub archive_path: Option<PathBuf>,
    pub archive_bytes: u64,
    pub batches: usize,
    pub csv_path: Option<PathBuf>,
    pub verified: bool,
    pub deletion: DeletionStatus,
    pub dry_run: bool,
}

impl RunSummary {
    fn from_context(context: &RunContext) -> Self {
        let manifest = &context.manifest;
        Self {
            root_path: context.config.root_path.clone(),
            file_count: manifest.len(),
            total_bytes: manifest.total_bytes(),
            hash_failures: manifest.hash_failures().count(),
            name_collisions: manifest.name_collisions().to_vec(),
            not_archived: Vec::new(),
            archive_path: None,
            archive_bytes: 0,
            batches: 0,
            csv_path: None,
            verified: false,
            deletion: DeletionStatus::NotRequested,
            dry_run: context.config.dry_run,
        }
    }
}

/// End state of a run that did not fail
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Nothing matched the extension; nothing was written
    NoFilesFound,
    Completed(RunSummary),
}

/// One archive run
pub struct Pipeline<'a> {
    config: ArchiveConfig,
    hasher: &'a dyn IntegrityHasher,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: ArchiveConfig, hasher: &'a dyn IntegrityHasher) -> Self {
        Self { config, hasher }
    }

    /// Discover matching files and build the manifest
    ///
    /// Returns `None` when no file matched.
    pub fn scan(&self, reporter: &mut dyn ReportSink) -> ArchiveResult<Option<RunContext>> {
        let config = &self.config;
        reporter.scan_started(&config.root_path, &config.extension);

        let options = ScanOptions::new(config.extension.as_str())
            .exclude(config.destination_archive.clone())
            .exclude(config.csv_manifest_path());
        let files = FileScanner::new(options).scan(&config.root_path)?;

        if files.is_empty() {
            reporter.no_files_found(&config.root_path, &config.extension);
            return Ok(None);
        }
        reporter.files_discovered(files.len());

        let manifest = ManifestBuilder::new(&config.root_path, self.hasher).build(&files, reporter);
        info!(
            files = manifest.len(),
            bytes = manifest.total_bytes(),
            hash_failures = manifest.hash_failures().count(),
            "manifest built"
        );
        reporter.manifest_ready(&manifest);

        Ok(Some(RunContext {
            config: config.clone(),
            manifest,
        }))
    }

    /// Run every phase against the given collaborators
    pub fn run(
        &self,
        sink: &mut dyn ArchiveSink,
        prompts: &mut dyn ConfirmationProvider,
        reporter: &mut dyn ReportSink,
    ) -> ArchiveResult<RunOutcome> {
        let Some(context) = self.scan(reporter)? else {
            return Ok(RunOutcome::NoFilesFound);
        };
        let config = &context.config;
        let mut summary = RunSummary::from_context(&context);

        if config.dry_run {
            info!("dry run, archive not written");
            if config.delete_source_files {
                summary.deletion = DeletionStatus::Skipped;
            }
            reporter.run_finished(&summary);
            return Ok(RunOutcome::Completed(summary));
        }

        let header = ManifestHeader {
            archive_date: config.started_at,
            root_path: config.root_path.clone(),
            archive_path: config.destination_archive.clone(),
        };
        let report = BatchArchiver::new(config.batch_size).write(
            &context.manifest,
            &header,
            sink,
            reporter,
        )?;

        let archive_bytes = fs::metadata(&config.destination_archive)
            .map(|m| m.len())
            .unwrap_or(0);
        reporter.archive_written(&config.destination_archive, archive_bytes);
        summary.archive_path = Some(config.destination_archive.clone());
        summary.archive_bytes = archive_bytes;
        summary.batches = report.batches;
        summary.not_archived = report.skipped.clone();

        if config.generate_manifest_csv {
            let csv_path = config.csv_manifest_path();
            write_csv_manifest(&context.manifest, &csv_path)?;
            reporter.csv_written(&csv_path);
            summary.csv_path = Some(csv_path);
        }

        if config.verify_archive {
            let checked = verify_archive(&config.destination_archive, &context.manifest, &report)?;
            reporter.verification_passed(checked);
            summary.verified = true;
        }

        if config.delete_source_files {
            // Only files the archive holds a copy of
            let targets = context
                .manifest
                .entries()
                .iter()
                .filter(|e| report.is_archived(e.relative_path()))
                .collect();
            debug!(skipped = report.skipped.len(), "starting deletion guard");
            let outcome = DeletionGuard::for_entries(targets).run(prompts, reporter)?;
            summary.deletion = outcome.into();
        }

        reporter.run_finished(&summary);
        Ok(RunOutcome::Completed(summary))
    }
}

/// Run with SHA-256 hashing and a ZIP file at the configured destination
pub fn run_archive(
    config: ArchiveConfig,
    prompts: &mut dyn ConfirmationProvider,
    reporter: &mut dyn ReportSink,
) -> ArchiveResult<RunOutcome> {
    let hasher = Sha256Hasher;
    let mut sink = ZipArchiveSink::new(&config.destination_archive, config.compression_level);
    Pipeline::new(config, &hasher).run(&mut sink, prompts, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOverrides, Settings};
    use crate::deletion::ScriptedResponses;
    use crate::error::ArchiveError;
    use crate::manifest::{ContentHash, ManifestEntry};
    use crate::report::NullReporter;
    use chrono::Local;
    use std::fs::File;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn write_tree(root: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = root.join(name);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, format!("backup {}", name)).unwrap();
                path
            })
            .collect()
    }

    fn config(temp: &TempDir, overrides: ConfigOverrides) -> ArchiveConfig {
        let root = temp.path().join("data");
        fs::create_dir_all(&root).unwrap();
        let overrides = ConfigOverrides {
            destination_archive: overrides
                .destination_archive
                .or_else(|| Some(temp.path().join("out").join("archive.zip"))),
            ..overrides
        };
        ArchiveConfig::resolve(&root, overrides, &Settings::default(), Local::now()).unwrap()
    }

    /// Fails for one named file, hashes everything else
    struct FlakyHasher {
        fail_name: &'static str,
    }

    impl IntegrityHasher for FlakyHasher {
        fn hash_file(&self, path: &Path) -> ContentHash {
            if path.file_name().and_then(|n| n.to_str()) == Some(self.fail_name) {
                ContentHash::Failed("sharing violation".into())
            } else {
                Sha256Hasher.hash_file(path)
            }
        }
    }

    #[derive(Default)]
    struct CountingSink {
        batches: Vec<usize>,
        manifest_entries: Vec<String>,
    }

    impl ArchiveSink for CountingSink {
        fn append_batch(&mut self, batch: &[ManifestEntry]) -> ArchiveResult<Vec<SkippedEntry>> {
            self.batches.push(batch.len());
            Ok(Vec::new())
        }

        fn append_manifest(&mut self, entry_name: &str, _source: &Path) -> ArchiveResult<()> {
            self.manifest_entries.push(entry_name.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Events {
        no_files: bool,
        hash_failures: Vec<PathBuf>,
        progress: Vec<(usize, usize)>,
        finished: Option<RunSummary>,
    }

    impl ReportSink for Events {
        fn no_files_found(&mut self, _root: &Path, _extension: &str) {
            self.no_files = true;
        }

        fn hash_failed(&mut self, path: &Path, _reason: &str) {
            self.hash_failures.push(path.to_path_buf());
        }

        fn file_scanned(&mut self, index: usize, total: usize, _entry: &ManifestEntry) {
            self.progress.push((index, total));
        }

        fn run_finished(&mut self, summary: &RunSummary) {
            self.finished = Some(summary.clone());
        }
    }

    fn completed(outcome: RunOutcome) -> RunSummary {
        match outcome {
            RunOutcome::Completed(summary) => summary,
            RunOutcome::NoFilesFound => panic!("expected a completed run"),
        }
    }

    #[test]
    fn test_no_files_found_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp, ConfigOverrides::default());
        write_tree(&config.root_path, &["notes.txt", "other.bakx"]);
        let destination = config.destination_archive.clone();

        let mut events = Events::default();
        let outcome = run_archive(config, &mut ScriptedResponses::default(), &mut events).unwrap();

        assert!(matches!(outcome, RunOutcome::NoFilesFound));
        assert!(events.no_files);
        assert!(events.finished.is_none());
        assert!(!destination.exists());
    }

    #[test]
    fn test_one_hash_failure_of_five() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp, ConfigOverrides::default());
        write_tree(
            &config.root_path,
            &["a.bak", "b.bak", "locked.bak", "sub/c.bak", "sub/d.bak"],
        );
        let destination = config.destination_archive.clone();

        let hasher = FlakyHasher {
            fail_name: "locked.bak",
        };
        let mut sink = ZipArchiveSink::new(&destination, 6);
        let mut events = Events::default();
        let summary = completed(
            Pipeline::new(config, &hasher)
                .run(&mut sink, &mut ScriptedResponses::default(), &mut events)
                .unwrap(),
        );

        assert_eq!(summary.file_count, 5);
        assert_eq!(summary.hash_failures, 1);
        assert!(summary.not_archived.is_empty());
        assert_eq!(events.hash_failures.len(), 1);
        assert_eq!(events.progress.last(), Some(&(5, 5)));

        let archive = ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        assert_eq!(archive.len(), 6);
        assert!(archive.index_for_name("locked.bak").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_does_not_abort_run() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let config = config(
            &temp,
            ConfigOverrides {
                verify_archive: true,
                delete_source_files: true,
                generate_manifest_csv: true,
                ..ConfigOverrides::default()
            },
        );
        let files = write_tree(
            &config.root_path,
            &["a.bak", "b.bak", "locked.bak", "sub/c.bak", "sub/d.bak"],
        );
        let locked = files[2].clone();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&locked).is_ok() {
            // Permission bits are not enforced for this user
            return;
        }
        let destination = config.destination_archive.clone();

        let mut prompts = ScriptedResponses::new(["yes", "yes", "DELETE"]);
        let result = run_archive(config, &mut prompts, &mut NullReporter);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        let summary = completed(result.unwrap());

        assert_eq!(summary.file_count, 5);
        assert_eq!(summary.hash_failures, 1);
        assert_eq!(summary.not_archived.len(), 1);
        assert_eq!(summary.not_archived[0].relative_path, "locked.bak");
        assert!(summary.verified);

        let mut archive = ZipArchive::new(File::open(&destination).unwrap()).unwrap();
        assert_eq!(archive.len(), 5);
        assert!(archive.index_for_name("locked.bak").is_none());
        let mut text = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("MANIFEST.txt").unwrap(), &mut text)
            .unwrap();
        assert!(text.contains("NOT ARCHIVED (1 file(s), unreadable):"));

        match summary.deletion {
            DeletionStatus::Completed(report) => {
                assert_eq!(report.deleted_count, 4);
                assert_eq!(report.failed_count(), 0);
            }
            other => panic!("unexpected deletion status: {:?}", other),
        }
        assert!(locked.exists());
    }

    #[test]
    fn test_two_files_batch_size_one() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp, ConfigOverrides::default());
        let deep = "1/2/3/4/5/6/7/8/9/10/deep.bak";
        write_tree(&config.root_path, &["top.bak", deep]);

        let pipeline = Pipeline {
            config: ArchiveConfig {
                batch_size: 1,
                ..config
            },
            hasher: &Sha256Hasher,
        };
        let mut sink = CountingSink::default();
        let summary = completed(
            pipeline
                .run(&mut sink, &mut ScriptedResponses::default(), &mut NullReporter)
                .unwrap(),
        );

        assert_eq!(summary.batches, 2);
        assert_eq!(sink.batches, vec![1, 1]);
        assert_eq!(sink.manifest_entries, vec!["MANIFEST.txt".to_string()]);
    }

    #[test]
    fn test_dry_run_writes_and_deletes_nothing() {
        let temp = TempDir::new().unwrap();
        let config = config(
            &temp,
            ConfigOverrides {
                dry_run: true,
                delete_source_files: true,
                generate_manifest_csv: true,
                ..ConfigOverrides::default()
            },
        );
        let files = write_tree(&config.root_path, &["a.bak"]);
        let destination = config.destination_archive.clone();
        let csv = config.csv_manifest_path();

        let mut prompts = ScriptedResponses::new(["yes", "yes", "DELETE"]);
        let summary = completed(run_archive(config, &mut prompts, &mut NullReporter).unwrap());

        assert!(summary.dry_run);
        assert_eq!(summary.archive_path, None);
        assert_eq!(summary.deletion, DeletionStatus::Skipped);
        assert!(prompts.asked().is_empty());
        assert!(!destination.exists());
        assert!(!csv.exists());
        assert!(files[0].exists());
    }

    #[test]
    fn test_csv_and_verification() {
        let temp = TempDir::new().unwrap();
        let config = config(
            &temp,
            ConfigOverrides {
                generate_manifest_csv: true,
                verify_archive: true,
                ..ConfigOverrides::default()
            },
        );
        write_tree(&config.root_path, &["a.bak", "x/b.bak"]);
        let expected_csv = config.csv_manifest_path();

        let summary = completed(
            run_archive(config, &mut ScriptedResponses::default(), &mut NullReporter).unwrap(),
        );

        assert!(summary.verified);
        assert_eq!(summary.csv_path.as_deref(), Some(expected_csv.as_path()));
        assert!(expected_csv.exists());
        assert!(summary.archive_bytes > 0);
    }

    #[test]
    fn test_archive_and_csv_under_root_are_not_rescanned() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("data");
        let config = config(
            &temp,
            ConfigOverrides {
                destination_archive: Some(root.join("self.bak")),
                generate_manifest_csv: true,
                ..ConfigOverrides::default()
            },
        );
        write_tree(&config.root_path, &["a.bak"]);

        let summary = completed(
            run_archive(config, &mut ScriptedResponses::default(), &mut NullReporter).unwrap(),
        );
        assert_eq!(summary.file_count, 1);
    }

    #[test]
    fn test_confirmed_deletion_removes_sources() {
        let temp = TempDir::new().unwrap();
        let config = config(
            &temp,
            ConfigOverrides {
                delete_source_files: true,
                ..ConfigOverrides::default()
            },
        );
        let files = write_tree(&config.root_path, &["a.bak", "b/c.bak"]);

        let mut prompts = ScriptedResponses::new(["y", "yes", "DELETE"]);
        let summary = completed(run_archive(config, &mut prompts, &mut NullReporter).unwrap());

        match summary.deletion {
            DeletionStatus::Completed(report) => assert_eq!(report.deleted_count, 2),
            other => panic!("unexpected deletion status: {:?}", other),
        }
        assert!(files.iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_declined_deletion_keeps_sources() {
        let temp = TempDir::new().unwrap();
        let config = config(
            &temp,
            ConfigOverrides {
                delete_source_files: true,
                ..ConfigOverrides::default()
            },
        );
        let files = write_tree(&config.root_path, &["a.bak"]);

        let mut prompts = ScriptedResponses::new(["yes", "no"]);
        let summary = completed(run_archive(config, &mut prompts, &mut NullReporter).unwrap());

        assert_eq!(summary.deletion, DeletionStatus::Aborted(DeletionGate::Final));
        assert!(files[0].exists());
    }

    #[test]
    fn test_failed_verification_prevents_deletion() {
        struct DroppingSink(ZipArchiveSink);

        impl ArchiveSink for DroppingSink {
            fn append_batch(
                &mut self,
                batch: &[ManifestEntry],
            ) -> ArchiveResult<Vec<SkippedEntry>> {
                self.0.append_batch(&batch[1..])
            }

            fn append_manifest(&mut self, entry_name: &str, source: &Path) -> ArchiveResult<()> {
                self.0.append_manifest(entry_name, source)
            }
        }

        let temp = TempDir::new().unwrap();
        let config = config(
            &temp,
            ConfigOverrides {
                verify_archive: true,
                delete_source_files: true,
                ..ConfigOverrides::default()
            },
        );
        let files = write_tree(&config.root_path, &["a.bak", "b.bak"]);
        let mut sink = DroppingSink(ZipArchiveSink::new(&config.destination_archive, 6));

        let mut prompts = ScriptedResponses::new(["yes", "yes", "DELETE"]);
        let err = Pipeline::new(config, &Sha256Hasher)
            .run(&mut sink, &mut prompts, &mut NullReporter)
            .unwrap_err();

        assert!(matches!(err, ArchiveError::Verification(_)));
        assert!(prompts.asked().is_empty());
        assert!(files.iter().all(|p| p.exists()));
    }
}
