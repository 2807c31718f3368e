//! Content hashing
//!
//! Hashing failures are values, not errors: an unreadable file gets a
//! `ContentHash::Failed` and the run carries on with the rest.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::manifest::ContentHash;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Computes the content hash of a single file
pub trait IntegrityHasher {
    fn hash_file(&self, path: &Path) -> ContentHash;
}

/// Streaming SHA-256 over the file contents
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    /// Hash everything readable from `reader`
    pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl IntegrityHasher for Sha256Hasher {
    fn hash_file(&self, path: &Path) -> ContentHash {
        let result = File::open(path)
            .map(|file| BufReader::with_capacity(READ_BUFFER_SIZE, file))
            .and_then(Self::hash_reader);

        match result {
            Ok(hex) => ContentHash::Digest(hex),
            Err(e) => ContentHash::Failed(e.to_string()),
        }
    }
}
