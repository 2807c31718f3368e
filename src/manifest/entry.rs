//! A single manifest record

use std::fmt;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

/// Rendered in place of a digest when hashing failed
pub const HASH_ERROR_MARKER: &str = "ERROR_CALCULATING_HASH";

const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Result of hashing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentHash {
    /// Lowercase hex SHA-256 digest
    Digest(String),
    /// Hashing failed; the reason is kept for the warning and the summary
    Failed(String),
}

impl ContentHash {
    /// The hex digest, if hashing succeeded
    pub fn digest(&self) -> Option<&str> {
        match self {
            Self::Digest(hex) => Some(hex),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest(hex) => f.write_str(hex),
            Self::Failed(_) => f.write_str(HASH_ERROR_MARKER),
        }
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Metadata recorded for one archived file
///
/// Fields are private so an entry cannot change once it is in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    original_path: PathBuf,
    relative_path: String,
    file_name: String,
    size_bytes: u64,
    content_hash: ContentHash,
    last_modified: DateTime<Local>,
    archived_at: DateTime<Local>,
}

impl ManifestEntry {
    pub fn new(
        original_path: PathBuf,
        relative_path: String,
        size_bytes: u64,
        content_hash: ContentHash,
        last_modified: DateTime<Local>,
        archived_at: DateTime<Local>,
    ) -> Self {
        let file_name = original_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            original_path,
            relative_path,
            file_name,
            size_bytes,
            content_hash,
            last_modified,
            archived_at,
        }
    }

    /// Absolute path of the source file
    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    /// Root-relative, forward-slash path; also the in-archive name
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Size in KiB rounded to two decimals
    pub fn size_kb(&self) -> f64 {
        round2(self.size_bytes as f64 / BYTES_PER_KB)
    }

    /// Size in MiB rounded to two decimals
    pub fn size_mb(&self) -> f64 {
        round2(self.size_bytes as f64 / BYTES_PER_MB)
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    pub fn last_modified(&self) -> DateTime<Local> {
        self.last_modified
    }

    /// When the entry was added to the manifest
    pub fn archived_at(&self) -> DateTime<Local> {
        self.archived_at
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the in-archive name of `path` relative to `root`
///
/// Components are joined with `/`; `.` components are dropped so the name
/// never starts with `./`. Returns `None` if `path` is not under `root` or
/// would escape it.
pub fn relative_archive_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_size(size: u64) -> ManifestEntry {
        let now = Local::now();
        ManifestEntry::new(
            PathBuf::from("/data/db/nightly.bak"),
            "db/nightly.bak".into(),
            size,
            ContentHash::Digest("ab".into()),
            now,
            now,
        )
    }

    #[test]
    fn test_file_name_derived_from_path() {
        let entry = entry_with_size(1);
        assert_eq!(entry.file_name(), "nightly.bak");
    }

    #[test]
    fn test_size_derivations() {
        let entry = entry_with_size(1_572_864);
        assert_eq!(entry.size_kb(), 1536.0);
        assert_eq!(entry.size_mb(), 1.5);

        let small = entry_with_size(1000);
        assert_eq!(small.size_kb(), 0.98);
        assert_eq!(small.size_mb(), 0.0);
    }

    #[test]
    fn test_hash_display() {
        assert_eq!(ContentHash::Digest("deadbeef".into()).to_string(), "deadbeef");
        let failed = ContentHash::Failed("permission denied".into());
        assert_eq!(failed.to_string(), HASH_ERROR_MARKER);
        assert!(failed.is_failed());
        assert_eq!(failed.digest(), None);
    }

    #[test]
    fn test_relative_archive_path() {
        let root = Path::new("/srv/backups");
        assert_eq!(
            relative_archive_path(root, Path::new("/srv/backups/a/b/c.bak")).as_deref(),
            Some("a/b/c.bak")
        );
        assert_eq!(
            relative_archive_path(root, Path::new("/srv/backups/./top.bak")).as_deref(),
            Some("top.bak")
        );
        assert_eq!(relative_archive_path(root, Path::new("/srv/other/x.bak")), None);
        assert_eq!(relative_archive_path(root, root), None);
    }
}
