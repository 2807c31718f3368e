//! Manifest data model
//!
//! The manifest is the ordered record of every discovered file. It is built
//! once during the scan phase by `ManifestBuilder` and is read-only after that:
//! the archiver, the text and CSV renderers, verification and the deletion
//! guard all consume the same `Manifest`.

mod builder;
mod entry;
mod text;

pub use builder::{Manifest, ManifestBuilder};
pub use entry::{relative_archive_path, ContentHash, ManifestEntry, HASH_ERROR_MARKER};
pub use text::{render_text_manifest, ManifestHeader};
