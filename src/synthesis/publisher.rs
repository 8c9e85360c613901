//! Atomic document publication.
//!
//! The proxy watches the output files and may read them at any time, so a
//! document is written to a temporary sibling and renamed over the target.
//! A reader sees either the previous or the new document, never a mix.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::synthesis::error::RenderError;

/// Replace `path` with `contents`, creating the file (and its directory) if
/// missing.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RenderError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(RenderError::io(path, e));
    }

    tracing::debug!(file = %path.display(), bytes = contents.len(), "Document published");
    Ok(())
}

/// `dir/.name.tmp`: same directory so the rename never crosses filesystems.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
