//! CLI command handlers
//!
//! Bridges clap argument parsing with the archive pipeline.

pub mod archive;
pub mod config;

pub use archive::{handle_archive_command, ArchiveArgs};
pub use config::{handle_config_command, ConfigCommands};
