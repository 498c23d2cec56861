//! Image discovery in label directories.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Supported image extensions (matched case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Check a path's extension against [`SUPPORTED_EXTENSIONS`].
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
}

/// List the images directly inside one label directory.
///
/// Hidden files and subdirectories are ignored. Order is whatever the
/// filesystem returns.
pub(crate) fn list_label_dir(directory: &str, path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Err(Error::DatasetDirectoryMissing {
            label: directory.to_string(),
            path: path.to_path_buf(),
        });
    }

    let entries = fs::read_dir(path).map_err(|e| {
        Error::Dataset(format!("Failed to read directory {}: {}", path.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::Dataset(format!("Failed to read entry in {}: {}", path.display(), e))
        })?;

        let file = entry.path();
        if file
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with('.'))
        {
            continue;
        }

        if file.is_file() && is_supported_image(&file) {
            files.push(file);
        }
    }

    if files.is_empty() {
        return Err(Error::EmptyLabelDirectory {
            label: directory.to_string(),
            path: path.to_path_buf(),
        });
    }

    Ok(files)
}
