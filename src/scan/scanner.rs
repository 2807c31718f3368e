//! Directory traversal for backup files
//!
//! Entries the walker cannot read (permission denied, removed mid-walk) are
//! skipped without a warning so that one locked directory does not prevent
//! the rest of the tree from being archived. Hash failures, by contrast, are
//! reported; the two are intentionally treated differently.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{ArchiveError, ArchiveResult};

/// Options for a scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extension to match, without the leading dot (case-insensitive)
    pub extension: String,

    /// Paths never returned even if they match (the archive being written)
    pub exclude_paths: Vec<PathBuf>,
}

impl ScanOptions {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            exclude_paths: Vec::new(),
        }
    }

    /// Add a path that must not be picked up
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude_paths.push(path.into());
        self
    }
}

/// Recursively enumerates regular files matching an extension
#[derive(Debug, Clone)]
pub struct FileScanner {
    options: ScanOptions,
    suffix: String,
}

impl FileScanner {
    pub fn new(options: ScanOptions) -> Self {
        let suffix = format!(
            ".{}",
            options
                .extension
                .trim_start_matches('.')
                .to_ascii_lowercase()
        );
        Self { options, suffix }
    }

    /// Walk `root` and collect matching files
    ///
    /// The order is a depth-first walk with directory entries sorted by
    /// name, so it is stable for an unchanged tree.
    ///
    /// # Errors
    ///
    /// Returns `RootNotFound` if `root` is not an existing directory.
    pub fn scan(&self, root: &Path) -> ArchiveResult<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(ArchiveError::RootNotFound(root.to_path_buf()));
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.matches(&entry) {
                continue;
            }

            if self.is_excluded(entry.path()) {
                debug!(path = %entry.path().display(), "skipping excluded path");
                continue;
            }

            files.push(entry.into_path());
        }

        Ok(files)
    }

    fn matches(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
        name.ends_with(&self.suffix)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.options.exclude_paths.iter().any(|p| p == path)
    }
}
