//! Display formatting for terminal output

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::manifest::{Manifest, ManifestEntry};

/// Characters of the digest shown in the preview table
const HASH_PREVIEW_LEN: usize = 16;

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Relative path")]
    relative_path: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "SHA256")]
    hash: String,
}

impl PreviewRow {
    fn new(index: usize, entry: &ManifestEntry) -> Self {
        let hash = entry.content_hash().to_string();
        let hash = match entry.content_hash().digest() {
            Some(_) if hash.len() > HASH_PREVIEW_LEN => format!("{}…", &hash[..HASH_PREVIEW_LEN]),
            _ => hash,
        };

        Self {
            index,
            relative_path: entry.relative_path().to_string(),
            size: format_size(entry.size_bytes()),
            hash,
        }
    }
}

/// Table of the first `limit` manifest entries
pub fn format_preview_table(manifest: &Manifest, limit: usize) -> String {
    let rows: Vec<PreviewRow> = manifest
        .entries()
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, entry)| PreviewRow::new(i + 1, entry))
        .collect();

    Table::new(rows).with(Style::modern()).to_string()
}

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
