//! User settings for bak-archiver
//!
//! Persisted defaults applied to every run unless a command-line flag
//! overrides them.

use serde::{Deserialize, Serialize};

use super::paths::ArchiverPaths;
use crate::error::ArchiveError;

/// User settings for bak-archiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// File extension to collect (without the leading dot)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Number of files appended to the archive per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Deflate level (0 stores entries uncompressed)
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,

    /// Write a `_manifest.csv` next to the archive
    #[serde(default)]
    pub generate_manifest_csv: bool,

    /// Re-read the archive after writing and check every hash
    #[serde(default)]
    pub verify_archive: bool,

    /// Number of entries shown in the scan preview table
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_schema_version() -> u32 {
    1
}

fn default_extension() -> String {
    "bak".to_string()
}

fn default_batch_size() -> u32 {
    500
}

fn default_compression_level() -> u8 {
    6
}

fn default_preview_rows() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            extension: default_extension(),
            batch_size: default_batch_size(),
            compression_level: default_compression_level(),
            generate_manifest_csv: false,
            verify_archive: false,
            preview_rows: default_preview_rows(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_default(paths: &ArchiverPaths) -> Result<Self, ArchiveError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| ArchiveError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| ArchiveError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ArchiverPaths) -> Result<(), ArchiveError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ArchiveError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| ArchiveError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
