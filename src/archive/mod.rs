//! Archive writing and verification
//!
//! # Architecture
//!
//! - `BatchArchiver`: splits the manifest into fixed-size batches and embeds
//!   the rendered text manifest after the last batch
//! - `ArchiveSink`: the append-only target the batches are written to
//! - `ZipArchiveSink`: `ArchiveSink` over a ZIP file on disk
//! - `verify_archive`: re-reads a finished archive and checks it against
//!   the manifest
//!
//! # Archive Layout
//!
//! Every file is stored under its root-relative path, so extracting the
//! archive reproduces the original subtree. One extra top-level entry,
//! `MANIFEST.txt`, holds the text manifest.
//!
//! A file whose hash already failed and that cannot be opened for archiving
//! is left out and listed in the text manifest; it is not an error.

mod batch;
mod verify;
mod zip_sink;

pub use batch::{
    manifest_entry_name, ArchiveReport, ArchiveSink, BatchArchiver, SkippedEntry,
    MANIFEST_ENTRY_NAME,
};
pub use verify::verify_archive;
pub use zip_sink::ZipArchiveSink;
