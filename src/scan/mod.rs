//! File discovery and hashing
//!
//! - `FileScanner`: recursive enumeration of files matching an extension
//! - `IntegrityHasher`: per-file content hashing that never aborts a run

mod hasher;
mod scanner;

pub use hasher::{IntegrityHasher, Sha256Hasher};
pub use scanner::{FileScanner, ScanOptions};
