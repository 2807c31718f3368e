//! Validated per-run configuration
//!
//! `ArchiveConfig` is built once per invocation by merging command-line
//! overrides over persisted `Settings`. Everything downstream can assume the
//! values are in range and the paths are absolute.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::settings::Settings;
use crate::error::{ArchiveError, ArchiveResult};

/// Smallest accepted batch size
pub const MIN_BATCH_SIZE: usize = 50;
/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 5000;

/// Values supplied on the command line; `None` falls back to settings
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub destination_archive: Option<PathBuf>,
    pub extension: Option<String>,
    pub batch_size: Option<u32>,
    pub compression_level: Option<u8>,
    pub generate_manifest_csv: bool,
    pub verify_archive: bool,
    pub delete_source_files: bool,
    pub dry_run: bool,
}

/// Validated configuration for a single archive run
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Resolved absolute scan root
    pub root_path: PathBuf,
    /// Resolved absolute archive path
    pub destination_archive: PathBuf,
    /// Extension filter, lowercase, without leading dot
    pub extension: String,
    /// Files per append operation
    pub batch_size: usize,
    /// Deflate level, 0 = stored
    pub compression_level: u8,
    pub generate_manifest_csv: bool,
    pub verify_archive: bool,
    pub delete_source_files: bool,
    pub dry_run: bool,
    /// Rows shown in the scan preview
    pub preview_rows: usize,
    /// Time the run started; used in derived names and the manifest header
    pub started_at: DateTime<Local>,
}

impl ArchiveConfig {
    /// Merge overrides over settings and validate the result
    pub fn resolve(
        root: &Path,
        overrides: ConfigOverrides,
        settings: &Settings,
        started_at: DateTime<Local>,
    ) -> ArchiveResult<Self> {
        let root_path = resolve_root(root)?;

        let batch_size = overrides.batch_size.unwrap_or(settings.batch_size) as usize;
        validate_batch_size(batch_size)?;

        let compression_level = overrides
            .compression_level
            .unwrap_or(settings.compression_level);
        if compression_level > 9 {
            return Err(ArchiveError::Validation(format!(
                "Compression level must be between 0 and 9, got {}",
                compression_level
            )));
        }

        let extension = normalize_extension(
            overrides
                .extension
                .as_deref()
                .unwrap_or(&settings.extension),
        )?;

        let destination_archive = match overrides.destination_archive {
            Some(path) => absolutize(&path)?,
            None => default_destination(&root_path, started_at),
        };
        validate_destination(&destination_archive)?;

        Ok(Self {
            root_path,
            destination_archive,
            extension,
            batch_size,
            compression_level,
            generate_manifest_csv: overrides.generate_manifest_csv || settings.generate_manifest_csv,
            verify_archive: overrides.verify_archive || settings.verify_archive,
            delete_source_files: overrides.delete_source_files,
            dry_run: overrides.dry_run,
            preview_rows: settings.preview_rows,
            started_at,
        })
    }

    /// Path of the CSV manifest written next to the archive
    pub fn csv_manifest_path(&self) -> PathBuf {
        csv_manifest_path(&self.destination_archive)
    }
}

/// `<dir>/<archive-stem>_manifest.csv` for a given archive path
pub fn csv_manifest_path(archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "bak-archive".to_string());
    archive.with_file_name(format!("{}_manifest.csv", stem))
}

/// `<parent-of-root>/bak-archive_<timestamp>.zip`
pub fn default_destination(root: &Path, started_at: DateTime<Local>) -> PathBuf {
    let parent = root.parent().unwrap_or(root);
    parent.join(format!(
        "bak-archive_{}.zip",
        started_at.format("%Y%m%d_%H%M%S")
    ))
}

/// Check a batch size against the accepted range
pub fn validate_batch_size(batch_size: usize) -> ArchiveResult<()> {
    if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&batch_size) {
        return Err(ArchiveError::Validation(format!(
            "Batch size must be between {} and {}, got {}",
            MIN_BATCH_SIZE, MAX_BATCH_SIZE, batch_size
        )));
    }
    Ok(())
}

fn resolve_root(root: &Path) -> ArchiveResult<PathBuf> {
    if !root.is_dir() {
        return Err(ArchiveError::RootNotFound(root.to_path_buf()));
    }
    root.canonicalize()
        .map_err(|_| ArchiveError::RootNotFound(root.to_path_buf()))
}

fn normalize_extension(raw: &str) -> ArchiveResult<String> {
    let trimmed = raw.trim().trim_start_matches("*.").trim_start_matches('.');
    if trimmed.is_empty() || trimmed.contains(|c: char| c == '/' || c == '\\') {
        return Err(ArchiveError::Validation(format!(
            "Invalid file extension: '{}'",
            raw
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}

fn absolutize(path: &Path) -> ArchiveResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| ArchiveError::Config(format!("Cannot resolve working directory: {}", e)))?;
    Ok(cwd.join(path))
}

fn validate_destination(destination: &Path) -> ArchiveResult<()> {
    if destination.exists() {
        return Err(ArchiveError::destination(destination, "file already exists"));
    }

    // Walk up to the first existing ancestor; it must be a directory
    let mut ancestor = destination.parent();
    while let Some(dir) = ancestor {
        if dir.exists() {
            if !dir.is_dir() {
                return Err(ArchiveError::destination(
                    destination,
                    format!("{} is not a directory", dir.display()),
                ));
            }
            break;
        }
        ancestor = dir.parent();
    }

    Ok(())
}
