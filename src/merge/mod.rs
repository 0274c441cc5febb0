//! Structural merges for config files owned by other programs
//!
//! Both merges are pure text/document transformations. Reading the file and
//! writing the result back is up to the caller ([`write_merged`] covers the
//! common case).

pub mod document;
pub mod lines;

pub use document::{Document, DocumentPatch, MapFieldPatch, merge_document};
pub use lines::{SectionRewrite, ensure_section_key, merge_line_config};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read `path` (missing file reads as empty), transform, write back.
///
/// Parent directories are created. With `mode` set the file permissions are
/// forced to it after writing, so an existing world-readable secret file is
/// tightened too.
pub fn write_merged<F>(path: &Path, mode: Option<u32>, transform: F) -> Result<()>
where
    F: FnOnce(&str) -> Result<String>,
{
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let merged = transform(&existing)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, merged).with_context(|| format!("Failed to write {}", path.display()))?;

    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}
