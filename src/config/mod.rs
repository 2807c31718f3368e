//! Configuration module for bak-archiver
//!
//! This module provides configuration management including:
//! - Settings file location
//! - Persisted default settings
//! - The validated per-run configuration handed to the pipeline

pub mod archive;
pub mod paths;
pub mod settings;

pub use archive::{ArchiveConfig, ConfigOverrides, MAX_BATCH_SIZE, MIN_BATCH_SIZE};
pub use paths::ArchiverPaths;
pub use settings::Settings;
