//! `bak-archive archive` command

use std::path::PathBuf;

use chrono::Local;
use clap::Args;

use crate::config::{ArchiveConfig, ConfigOverrides, Settings};
use crate::deletion::ConsolePrompt;
use crate::error::ArchiveResult;
use crate::pipeline::{run_archive, RunOutcome};
use crate::report::ConsoleReporter;

/// Arguments for an archive run
#[derive(Args, Debug, Clone)]
pub struct ArchiveArgs {
    /// Directory to scan recursively
    pub root: PathBuf,

    /// Archive to create (default: <parent-of-root>/bak-archive_<timestamp>.zip)
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// File extension to collect, with or without the leading dot
    #[arg(short, long, env = "BAK_ARCHIVER_EXTENSION")]
    pub extension: Option<String>,

    /// Files appended to the archive per batch (50-5000)
    #[arg(
        short,
        long,
        env = "BAK_ARCHIVER_BATCH_SIZE",
        value_parser = clap::value_parser!(u32).range(50..=5000)
    )]
    pub batch_size: Option<u32>,

    /// Deflate level, 0 stores entries uncompressed (0-9)
    #[arg(
        short,
        long,
        env = "BAK_ARCHIVER_COMPRESSION_LEVEL",
        value_parser = clap::value_parser!(u8).range(0..=9)
    )]
    pub compression_level: Option<u8>,

    /// Also write <archive-stem>_manifest.csv next to the archive
    #[arg(long)]
    pub csv: bool,

    /// Re-read the archive and check every entry against the manifest
    #[arg(long)]
    pub verify: bool,

    /// Permanently delete the source files after archiving (asks three times)
    #[arg(long)]
    pub delete: bool,

    /// Scan and preview only; write and delete nothing
    #[arg(long)]
    pub dry_run: bool,
}

impl ArchiveArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            destination_archive: self.destination.clone(),
            extension: self.extension.clone(),
            batch_size: self.batch_size,
            compression_level: self.compression_level,
            generate_manifest_csv: self.csv,
            verify_archive: self.verify,
            delete_source_files: self.delete,
            dry_run: self.dry_run,
        }
    }
}

/// Handle an archive command
pub fn handle_archive_command(settings: &Settings, args: ArchiveArgs) -> ArchiveResult<()> {
    let config = ArchiveConfig::resolve(&args.root, args.overrides(), settings, Local::now())?;

    if config.dry_run {
        println!("Dry run: nothing will be written or deleted.");
    }
    println!("Archive: {}", config.destination_archive.display());

    let mut reporter = ConsoleReporter::new(config.preview_rows);
    let mut prompts = ConsolePrompt::stdio();

    match run_archive(config, &mut prompts, &mut reporter)? {
        RunOutcome::NoFilesFound | RunOutcome::Completed(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ArchiveArgs,
    }

    #[test]
    fn test_flags_map_to_overrides() {
        let cli = TestCli::try_parse_from([
            "test",
            "/data",
            "--destination",
            "/out/a.zip",
            "--extension",
            ".BAK",
            "--batch-size",
            "100",
            "--compression-level",
            "0",
            "--csv",
            "--delete",
        ])
        .unwrap();

        let overrides = cli.args.overrides();
        assert_eq!(overrides.destination_archive, Some(PathBuf::from("/out/a.zip")));
        assert_eq!(overrides.extension.as_deref(), Some(".BAK"));
        assert_eq!(overrides.batch_size, Some(100));
        assert_eq!(overrides.compression_level, Some(0));
        assert!(overrides.generate_manifest_csv);
        assert!(overrides.delete_source_files);
        assert!(!overrides.verify_archive);
        assert!(!overrides.dry_run);
    }

    #[test]
    fn test_batch_size_range_enforced_by_parser() {
        assert!(TestCli::try_parse_from(["test", "/data", "--batch-size", "49"]).is_err());
        assert!(TestCli::try_parse_from(["test", "/data", "--batch-size", "5001"]).is_err());
        assert!(TestCli::try_parse_from(["test", "/data", "--batch-size", "5000"]).is_ok());
        assert!(TestCli::try_parse_from(["test", "/data", "-c", "10"]).is_err());
    }
}
