//! ZIP archive target
//!
//! The first batch creates the archive. Every later batch reopens it with
//! `ZipWriter::new_append`, which keeps the existing entries and rewrites only
//! the central directory, so the archive is never rebuilt from scratch.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Timelike};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::batch::{ArchiveSink, SkippedEntry};
use crate::error::{ArchiveError, ArchiveResult};
use crate::manifest::ManifestEntry;

/// `ArchiveSink` writing a ZIP file on disk
pub struct ZipArchiveSink {
    destination: PathBuf,
    compression_level: u8,
    created: bool,
}

impl ZipArchiveSink {
    /// `compression_level` 0 stores entries, 1-9 deflates them
    pub fn new(destination: impl Into<PathBuf>, compression_level: u8) -> Self {
        Self {
            destination: destination.into(),
            compression_level,
            created: false,
        }
    }

    /// Open the archive for the next append, creating it on first use
    fn open_writer(&mut self) -> ArchiveResult<ZipWriter<File>> {
        if self.created {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(&self.destination)
                .map_err(|e| {
                    ArchiveError::ArchiveWrite(format!(
                        "Failed to reopen {}: {}",
                        self.destination.display(),
                        e
                    ))
                })?;
            return Ok(ZipWriter::new_append(file)?);
        }

        if let Some(parent) = self.destination.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ArchiveError::destination(&self.destination, e))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&self.destination)
            .map_err(|e| ArchiveError::destination(&self.destination, e))?;

        self.created = true;
        debug!(path = %self.destination.display(), "archive created");
        Ok(ZipWriter::new(file))
    }

    fn options(&self) -> SimpleFileOptions {
        let options = SimpleFileOptions::default().unix_permissions(0o644);
        if self.compression_level == 0 {
            options.compression_method(CompressionMethod::Stored)
        } else {
            options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(self.compression_level)))
        }
    }
}

impl ArchiveSink for ZipArchiveSink {
    fn append_batch(&mut self, batch: &[ManifestEntry]) -> ArchiveResult<Vec<SkippedEntry>> {
        let mut writer = self.open_writer()?;
        let mut skipped = Vec::new();

        for entry in batch {
            let options = self
                .options()
                .last_modified_time(zip_timestamp(entry))
                .large_file(entry.size_bytes() >= u64::from(u32::MAX));

            let mut source = match File::open(entry.original_path()) {
                Ok(file) => file,
                Err(e) if entry.content_hash().is_failed() => {
                    warn!(
                        path = %entry.original_path().display(),
                        error = %e,
                        "unreadable file left out of archive"
                    );
                    skipped.push(SkippedEntry {
                        original_path: entry.original_path().to_path_buf(),
                        relative_path: entry.relative_path().to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
                Err(e) => {
                    return Err(ArchiveError::ArchiveWrite(format!(
                        "Failed to read {}: {}",
                        entry.original_path().display(),
                        e
                    )))
                }
            };

            writer.start_file(entry.relative_path(), options)?;
            io::copy(&mut source, &mut writer).map_err(|e| {
                ArchiveError::ArchiveWrite(format!(
                    "Failed to add {}: {}",
                    entry.relative_path(),
                    e
                ))
            })?;
        }

        writer.finish()?;
        Ok(skipped)
    }

    fn append_manifest(&mut self, entry_name: &str, source: &Path) -> ArchiveResult<()> {
        let mut writer = self.open_writer()?;
        let mut file = File::open(source).map_err(|e| {
            ArchiveError::ArchiveWrite(format!("Failed to read staged manifest: {}", e))
        })?;

        writer.start_file(entry_name, self.options())?;
        io::copy(&mut file, &mut writer).map_err(|e| {
            ArchiveError::ArchiveWrite(format!("Failed to add {}: {}", entry_name, e))
        })?;
        writer.finish()?;
        Ok(())
    }
}

/// ZIP timestamps cannot represent dates before 1980; those fall back to the default
fn zip_timestamp(entry: &ManifestEntry) -> zip::DateTime {
    let modified = entry.last_modified();
    let (Ok(year), Ok(month), Ok(day), Ok(hour), Ok(minute), Ok(second)) = (
        u16::try_from(modified.year()),
        u8::try_from(modified.month()),
        u8::try_from(modified.day()),
        u8::try_from(modified.hour()),
        u8::try_from(modified.minute()),
        u8::try_from(modified.second()),
    ) else {
        return zip::DateTime::default();
    };

    zip::DateTime::from_date_and_time(year, month, day, hour, minute, second).unwrap_or_default()
}
