//! Manifest accumulation
//!
//! `ManifestBuilder` owns the entry list while files are being scanned and
//! hands back an immutable `Manifest` once the scan phase is over.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use super::entry::{relative_archive_path, ContentHash, ManifestEntry};
use crate::report::ReportSink;
use crate::scan::IntegrityHasher;

/// Ordered, read-only collection of manifest entries
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
    name_collisions: Vec<PathBuf>,
}

impl Manifest {
    /// Entries in discovery order
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discovered files left out because their archive name was already taken
    ///
    /// Only non-UTF-8 names that decode to the same text end up here.
    pub fn name_collisions(&self) -> &[PathBuf] {
        &self.name_collisions
    }

    /// Sum of all recorded sizes
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes()).sum()
    }

    /// Entries whose hash could not be computed
    pub fn hash_failures(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| e.content_hash().is_failed())
    }

    /// Whether some entry already uses `relative_path` as its archive name
    pub fn contains_relative_path(&self, relative_path: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.relative_path() == relative_path)
    }

    /// Contiguous batches of at most `batch_size` entries, in manifest order
    pub fn batches(&self, batch_size: usize) -> std::slice::Chunks<'_, ManifestEntry> {
        self.entries.chunks(batch_size.max(1))
    }
}

/// Builds the manifest one discovered file at a time
pub struct ManifestBuilder<'a> {
    root: PathBuf,
    hasher: &'a dyn IntegrityHasher,
    entries: Vec<ManifestEntry>,
    name_collisions: Vec<PathBuf>,
    seen: HashSet<String>,
}

impl<'a> ManifestBuilder<'a> {
    /// Create a builder for files under `root`
    pub fn new(root: impl Into<PathBuf>, hasher: &'a dyn IntegrityHasher) -> Self {
        Self {
            root: root.into(),
            hasher,
            entries: Vec::new(),
            name_collisions: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Record every file in `files`, reporting progress after each one
    pub fn build(mut self, files: &[PathBuf], reporter: &mut dyn ReportSink) -> Manifest {
        let total = files.len();
        for (index, path) in files.iter().enumerate() {
            if let Some(entry) = self.add_file(path, reporter) {
                reporter.file_scanned(index + 1, total, entry);
            }
        }
        self.finish()
    }

    /// Hash one file and append its entry
    ///
    /// Returns `None` if the file maps to an archive name that is already
    /// taken. Within one scan that only happens when lossy decoding of a
    /// non-UTF-8 name collides with another name; the file is recorded as a
    /// name collision and reported.
    pub fn add_file(
        &mut self,
        path: &Path,
        reporter: &mut dyn ReportSink,
    ) -> Option<&ManifestEntry> {
        let relative_path = relative_archive_path(&self.root, path).unwrap_or_else(|| {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string())
        });

        if !self.seen.insert(relative_path.clone()) {
            warn!(path = %path.display(), relative_path = %relative_path, "duplicate archive name skipped");
            reporter.name_collision(path, &relative_path);
            self.name_collisions.push(path.to_path_buf());
            return None;
        }

        let scanned_at = Local::now();
        let (size_bytes, last_modified, metadata_error) = read_metadata(path, scanned_at);

        let content_hash = match metadata_error {
            Some(reason) => ContentHash::Failed(reason),
            None => self.hasher.hash_file(path),
        };

        if let ContentHash::Failed(reason) = &content_hash {
            warn!(path = %path.display(), reason = %reason, "hash calculation failed");
            reporter.hash_failed(path, reason);
        } else {
            debug!(path = %path.display(), relative_path = %relative_path, size_bytes, "file recorded");
        }

        self.entries.push(ManifestEntry::new(
            path.to_path_buf(),
            relative_path,
            size_bytes,
            content_hash,
            last_modified,
            Local::now(),
        ));
        self.entries.last()
    }

    /// Number of entries recorded so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Freeze the collected entries
    pub fn finish(self) -> Manifest {
        Manifest {
            entries: self.entries,
            name_collisions: self.name_collisions,
        }
    }
}

fn read_metadata(
    path: &Path,
    fallback_time: DateTime<Local>,
) -> (u64, DateTime<Local>, Option<String>) {
    match fs::metadata(path) {
        Ok(metadata) => {
            let modified = metadata
                .modified()
                .map(DateTime::<Local>::from)
                .unwrap_or(fallback_time);
            (metadata.len(), modified, None)
        }
        Err(e) => (0, fallback_time, Some(e.to_string())),
    }
}
