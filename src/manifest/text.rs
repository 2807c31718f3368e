//! Human-readable manifest embedded in the archive

use std::fmt::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use super::builder::Manifest;

const RULE: &str =
    "================================================================================";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Run metadata printed at the top of the text manifest
#[derive(Debug, Clone)]
pub struct ManifestHeader {
    pub archive_date: DateTime<Local>,
    pub root_path: PathBuf,
    pub archive_path: PathBuf,
}

/// Render the manifest as the fixed-format text block
pub fn render_text_manifest(header: &ManifestHeader, manifest: &Manifest) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "BACKUP FILE ARCHIVE MANIFEST");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "Archive date:   {}",
        header.archive_date.format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(out, "Analyzed root:  {}", header.root_path.display());
    let _ = writeln!(out, "Archive path:   {}", header.archive_path.display());
    let _ = writeln!(out, "File count:     {}", manifest.len());
    let _ = writeln!(
        out,
        "Total size:     {:.2} MB",
        manifest.total_bytes() as f64 / (1024.0 * 1024.0)
    );
    let _ = writeln!(out, "{}", RULE);

    for (index, entry) in manifest.entries().iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}] {}", index + 1, entry.file_name());
        let _ = writeln!(out, "    Original path:  {}", entry.original_path().display());
        let _ = writeln!(out, "    Relative path:  {}", entry.relative_path());
        let _ = writeln!(
            out,
            "    Size:           {:.2} KB ({:.2} MB)",
            entry.size_kb(),
            entry.size_mb()
        );
        let _ = writeln!(out, "    SHA256:         {}", entry.content_hash());
        let _ = writeln!(
            out,
            "    Last modified:  {}",
            entry.last_modified().format(TIMESTAMP_FORMAT)
        );
    }

    out
}
