//! Verbatim copying of static files into the output root.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::builder::BuildError;

/// Recursively copy `src` into `dest`, overwriting existing files.
///
/// Returns `Ok(None)` when `src` does not exist. Files already copied stay in
/// place if a later one fails.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<Option<usize>, BuildError> {
    if !src.is_dir() {
        tracing::info!("Skipping {}: directory not found", src.display());
        return Ok(None);
    }

    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::CopyError(e.to_string()))?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BuildError::CopyError(e.to_string()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| BuildError::CopyError(format!("{}: {}", target.display(), e)))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| {
                BuildError::CopyError(format!("{}: {}", entry.path().display(), e))
            })?;
            copied += 1;
        }
    }

    Ok(Some(copied))
}

/// Copy a single optional file. Returns whether it existed.
pub fn copy_file_if_exists(src: &Path, dest: &Path) -> Result<bool, BuildError> {
    if !src.is_file() {
        return Ok(false);
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BuildError::CopyError(format!("{}: {}", parent.display(), e)))?;
    }

    fs::copy(src, dest)
        .map_err(|e| BuildError::CopyError(format!("{}: {}", src.display(), e)))?;

    Ok(true)
}
