use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::models::error::StreamError;

/// Write `bytes` to `path` so that the destination either holds the complete
/// content or is left untouched.
///
/// The data goes to a temporary file in the destination's directory, is
/// synced, then renamed over `path`. On any failure the temporary file is
/// removed when it drops.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StreamError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir)
        .map_err(|e| StreamError::StorageError(format!("failed to create directory: {}", e)))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| StreamError::StorageError(format!("failed to create temporary file: {}", e)))?;
    tmp.write_all(bytes)
        .map_err(|e| StreamError::StorageError(format!("write failed: {}", e)))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StreamError::StorageError(format!("sync failed: {}", e)))?;

    tmp.persist(path).map_err(|e| {
        StreamError::StorageError(format!(
            "failed to move file into place at {}: {}",
            path.display(),
            e.error
        ))
    })?;
    Ok(())
}
