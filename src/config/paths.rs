//! Path management for bak-archiver
//!
//! ## Path Resolution Order
//!
//! 1. `BAK_ARCHIVER_CONFIG_DIR` environment variable (if set)
//! 2. The platform configuration directory for the project
//!    (`~/.config/bak-archiver`, `%APPDATA%\bak-archiver\config`, ...)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ArchiveError;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "BAK_ARCHIVER_CONFIG_DIR";

/// Manages the paths used by bak-archiver
#[derive(Debug, Clone)]
pub struct ArchiverPaths {
    /// Directory holding the settings file
    base_dir: PathBuf,
}

impl ArchiverPaths {
    /// Resolve the configuration directory
    ///
    /// # Errors
    ///
    /// Returns an error if no platform configuration directory can be
    /// determined and no override is set.
    pub fn new() -> Result<Self, ArchiveError> {
        let base_dir = if let Ok(custom) = std::env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "bak-archiver")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    ArchiveError::Config("Could not determine configuration directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create ArchiverPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base configuration directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure the configuration directory exists
    pub fn ensure_directories(&self) -> Result<(), ArchiveError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            ArchiveError::Io(format!("Failed to create config directory: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ArchiverPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var(CONFIG_DIR_ENV, temp_dir.path());

        let paths = ArchiverPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        std::env::remove_var(CONFIG_DIR_ENV);
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("config");
        let paths = ArchiverPaths::with_base_dir(nested.clone());

        paths.ensure_directories().unwrap();
        assert!(nested.is_dir());
    }
}
