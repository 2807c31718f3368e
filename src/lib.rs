//! bak-archiver - collect backup files into a single verified ZIP archive
//!
//! Discovers every file with a given extension under a root directory,
//! records each one in a manifest (relative path, size, SHA-256, mtime),
//! writes them into one ZIP archive in fixed-size batches, embeds a text
//! manifest, and optionally exports a CSV manifest, verifies the archive and
//! deletes the sources behind a three-step confirmation.
//!
//! # Architecture
//!
//! - `config`: settings file, paths and the validated per-run configuration
//! - `error`: custom error types
//! - `scan`: file discovery and hashing
//! - `manifest`: the manifest data model and text rendering
//! - `archive`: batched ZIP writing and verification
//! - `export`: CSV manifest export
//! - `deletion`: the confirmation state machine and source removal
//! - `report`: progress events and the console reporter
//! - `pipeline`: orchestration of one run
//!
//! # Example
//!
//! ```rust,ignore
//! use bak_archiver::config::{ArchiveConfig, ConfigOverrides, Settings};
//! use bak_archiver::deletion::ConsolePrompt;
//! use bak_archiver::pipeline::run_archive;
//! use bak_archiver::report::ConsoleReporter;
//!
//! let config = ArchiveConfig::resolve(root, ConfigOverrides::default(), &Settings::default(), chrono::Local::now())?;
//! run_archive(config, &mut ConsolePrompt::stdio(), &mut ConsoleReporter::new(10))?;
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod deletion;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod report;
pub mod scan;

pub use error::{ArchiveError, ArchiveResult};
